//! Error types for the collaborators around the scoring engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApexError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid rule table: {0}")]
    RuleTable(String),

    #[error("product lookup failed: {0}")]
    Lookup(#[from] reqwest::Error),

    #[error("product lookup returned status {0}")]
    UpstreamStatus(reqwest::StatusCode),

    #[error("could not decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cache error: {0}")]
    Cache(String),
}

pub type ApexResult<T> = Result<T, ApexError>;
