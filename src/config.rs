//! Server configuration from environment variables

use crate::error::{ApexError, ApexResult};
use crate::product_client::DEFAULT_OFF_BASE_URL;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub off_base_url: String,
    pub off_user_agent: String,
    pub cache_path: Option<PathBuf>,
    pub rules_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            off_base_url: DEFAULT_OFF_BASE_URL.to_string(),
            off_user_agent: default_user_agent(),
            cache_path: None,
            rules_path: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("ApexScanner - Rust - Version {}", env!("CARGO_PKG_VERSION"))
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> ApexResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(get: F) -> ApexResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match get("APEX_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ApexError::Config(format!("invalid APEX_PORT '{}': {}", raw, e)))?,
            None => defaults.port,
        };

        Ok(Self {
            host: get("APEX_HOST").unwrap_or(defaults.host),
            port,
            off_base_url: get("OFF_BASE_URL").unwrap_or(defaults.off_base_url),
            off_user_agent: get("OFF_USER_AGENT").unwrap_or(defaults.off_user_agent),
            cache_path: get("APEX_CACHE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            rules_path: get("APEX_RULES_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
