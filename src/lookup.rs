//! Barcode lookup: cache first, then the external source, then score and persist

use crate::error::{ApexError, ApexResult};
use crate::product_cache::ProductCache;
use crate::product_client::ProductSource;
use crate::scoring::ScoringEngine;
use crate::types::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Composes the scoring engine with a product source and a cache (thread-safe via Arc)
pub struct ProductService {
    pub engine: Arc<ScoringEngine>,
    pub source: Box<dyn ProductSource>,
    pub cache: Box<dyn ProductCache>,
}

pub type SharedProductService = Arc<ProductService>;

impl ProductService {
    pub fn new(
        engine: Arc<ScoringEngine>,
        source: Box<dyn ProductSource>,
        cache: Box<dyn ProductCache>,
    ) -> SharedProductService {
        Arc::new(Self {
            engine,
            source,
            cache,
        })
    }

    /// Score a raw ingredient list
    pub fn scan(&self, ingredients: &[String], mode: Mode) -> ScoreResult {
        self.engine.score(ingredients, mode)
    }

    /// Resolve a barcode to a scored product.
    ///
    /// Cache hits are served as stored, without rescoring. Upstream failures
    /// are logged and reported as `NotFound`; cache failures propagate.
    pub async fn lookup(&self, barcode: &str, mode: Mode) -> ApexResult<ProductResponse> {
        let start = Instant::now();

        if let Some(record) = self.cache.get(barcode).await? {
            info!("Cache hit for {} (score {:.1})", barcode, record.apex_score);
            return Ok(ProductResponse {
                record,
                source: ProductOrigin::Cache,
                analysis: None,
            });
        }

        let product = match self.source.fetch_product(barcode).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                info!("{} has no product for {}", self.source.name(), barcode);
                return Err(ApexError::NotFound(format!("product {}", barcode)));
            }
            Err(e) => {
                warn!("Lookup of {} via {} failed: {}", barcode, self.source.name(), e);
                return Err(ApexError::NotFound(format!("product {}", barcode)));
            }
        };

        let ingredients = product.ingredient_list();
        let analysis = self.engine.score(&ingredients, mode);

        let record = ProductRecord {
            barcode: barcode.to_string(),
            name: product.product_name,
            brand: product.brand,
            image_url: product.image_url,
            ingredients_text: ingredients.join(", "),
            apex_score: analysis.final_score,
            last_updated: Utc::now(),
        };
        self.cache.put(record.clone()).await?;

        info!(
            "Scored {} '{}' in {} mode: {:.1} ({}) in {}ms",
            barcode,
            record.name,
            mode,
            analysis.final_score,
            analysis.verdict,
            start.elapsed().as_millis()
        );

        Ok(ProductResponse {
            record,
            source: ProductOrigin::Live,
            analysis: Some(analysis),
        })
    }
}
