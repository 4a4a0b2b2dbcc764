//! apexscan HTTP server binary

use apexscan::{
    Classifier, FileProductCache, OpenFoodFactsClient, ProductCache, ProductService,
    ScoringEngine, ServerConfig,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod server {
    pub use apexscan::server::*;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    let config = ServerConfig::from_env()?;
    info!("apexscan v{}", env!("CARGO_PKG_VERSION"));

    let classifier = match &config.rules_path {
        Some(path) => {
            let classifier = Classifier::from_path(path)?;
            info!(
                "Loaded {} classification rules from {}",
                classifier.rules().len(),
                path.display()
            );
            classifier
        }
        None => {
            info!("Using built-in classification rules");
            Classifier::builtin()
        }
    };
    let engine = Arc::new(ScoringEngine::with_classifier(classifier));

    let cache: Box<dyn ProductCache> = match &config.cache_path {
        Some(path) => Box::new(FileProductCache::open(path).await?),
        None => {
            info!("Product cache is memory-only (set APEX_CACHE_PATH to persist)");
            Box::new(FileProductCache::in_memory())
        }
    };

    info!("Product lookups via {}", config.off_base_url);
    let source = OpenFoodFactsClient::new(config.off_base_url.clone(), config.off_user_agent.clone());

    let service = ProductService::new(engine, Box::new(source), cache);
    server::run_server(service, &config.bind_addr()).await?;

    Ok(())
}
