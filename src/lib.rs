//! apexscan - ingredient quality scoring
//!
//! Scores an ordered ingredient list for a usage mode (BULK or CUT) with a
//! deterministic, explainable heuristic:
//! - Keyword classification against a prioritized rule table
//! - Position weights that decay down the label
//! - Ordered scoring rules with a readable analysis trace
//! - Clamped 0-100 score and a verdict tier
//!
//! The HTTP server, OpenFoodFacts client and product cache are thin
//! collaborators around the engine.

pub mod types;
pub mod error;
pub mod classifier;
pub mod weighting;
pub mod scoring;
pub mod verdict;
pub mod product_client;
pub mod product_cache;
pub mod lookup;
pub mod config;
pub mod server;

pub use types::*;
pub use error::{ApexError, ApexResult};
pub use classifier::{Classifier, DEFAULT_RULES};
pub use scoring::{score, ScoreAccumulator, ScoringEngine, ScoringParams};
pub use verdict::finalize;
pub use product_client::{OpenFoodFactsClient, ProductSource, StaticProductSource};
pub use product_cache::{FileProductCache, ProductCache};
pub use lookup::{ProductService, SharedProductService};
pub use config::ServerConfig;
