//! Product lookup sources (OpenFoodFacts HTTP client and an in-memory stand-in)

use crate::error::{ApexError, ApexResult};
use crate::types::ProductInfo;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_OFF_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Trait for pluggable barcode lookups
#[async_trait]
pub trait ProductSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the source does not know the barcode
    async fn fetch_product(&self, barcode: &str) -> ApexResult<Option<ProductInfo>>;
}

#[derive(Debug, Deserialize)]
struct OffResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: Option<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OffProduct {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    ingredients_tags: Vec<String>,
    #[serde(default)]
    ingredients_text: Option<String>,
}

/// Turn an OFF ingredient tag like `en:whey-protein` into `whey protein`
pub fn clean_ingredient_tag(tag: &str) -> String {
    let value = match tag.split_once(':') {
        Some((_, value)) => value,
        None => tag,
    };
    value.replace('-', " ")
}

impl OffProduct {
    fn into_product_info(self) -> ProductInfo {
        ProductInfo {
            product_name: self
                .product_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown Product".to_string()),
            brand: self.brands.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            ingredients: self
                .ingredients_tags
                .iter()
                .map(|t| clean_ingredient_tag(t))
                .collect(),
            ingredients_text: self.ingredients_text.unwrap_or_default(),
        }
    }
}

/// Decode an OFF v0 product payload. `status != 1` means unknown barcode.
pub fn parse_off_payload(body: &str) -> ApexResult<Option<ProductInfo>> {
    let response: OffResponse = serde_json::from_str(body)?;
    if response.status != 1 {
        return Ok(None);
    }
    Ok(Some(response.product.unwrap_or_default().into_product_info()))
}

/// HTTP client for the OpenFoodFacts product API
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    base_url: String,
    user_agent: String,
    client: reqwest::Client,
}

impl OpenFoodFactsClient {
    /// Create a new client against `base_url` (no trailing slash needed)
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            client: reqwest::Client::new(),
        }
    }

    fn product_url(&self, barcode: &str) -> String {
        format!(
            "{}/api/v0/product/{}.json",
            self.base_url,
            urlencoding::encode(barcode)
        )
    }
}

#[async_trait]
impl ProductSource for OpenFoodFactsClient {
    fn name(&self) -> &'static str {
        "openfoodfacts"
    }

    async fn fetch_product(&self, barcode: &str) -> ApexResult<Option<ProductInfo>> {
        let url = self.product_url(barcode);
        debug!("Fetching product from {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApexError::UpstreamStatus(response.status()));
        }

        let body = response.text().await?;
        let product = parse_off_payload(&body)?;
        debug!(
            "OpenFoodFacts lookup for {}: {}",
            barcode,
            if product.is_some() { "found" } else { "unknown barcode" }
        );

        Ok(product)
    }
}

/// Fixed in-memory product source for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticProductSource {
    products: HashMap<String, ProductInfo>,
}

impl StaticProductSource {
    pub fn new(products: impl IntoIterator<Item = (String, ProductInfo)>) -> Self {
        Self {
            products: products.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ProductSource for StaticProductSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_product(&self, barcode: &str) -> ApexResult<Option<ProductInfo>> {
        Ok(self.products.get(barcode).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_ingredient_tag() {
        assert_eq!(clean_ingredient_tag("en:whey-protein"), "whey protein");
        assert_eq!(clean_ingredient_tag("fr:sucre-de-canne"), "sucre de canne");
        assert_eq!(clean_ingredient_tag("sugar"), "sugar");
    }

    #[test]
    fn test_parse_found_product() {
        let body = r#"{
            "status": 1,
            "product": {
                "product_name": "Choc Bar",
                "brands": "Acme",
                "image_url": "https://img/1.jpg",
                "ingredients_tags": ["en:whey-protein", "en:sugar", "en:e414"],
                "ingredients_text": "Whey protein, sugar, gum arabic"
            }
        }"#;
        let product = parse_off_payload(body).unwrap().unwrap();
        assert_eq!(product.product_name, "Choc Bar");
        assert_eq!(product.brand, "Acme");
        assert_eq!(product.ingredients, vec!["whey protein", "sugar", "e414"]);
    }

    #[test]
    fn test_parse_unknown_and_sparse_products() {
        let missing = r#"{"status": 0, "status_verbose": "product not found"}"#;
        assert!(parse_off_payload(missing).unwrap().is_none());

        let sparse = r#"{"status": 1, "product": {"ingredients_text": "Oats, Water"}}"#;
        let product = parse_off_payload(sparse).unwrap().unwrap();
        assert_eq!(product.product_name, "Unknown Product");
        assert!(product.ingredients.is_empty());
        assert_eq!(product.ingredient_list(), vec!["Oats", "Water"]);

        assert!(matches!(parse_off_payload("<html>"), Err(ApexError::Decode(_))));
    }

    #[test]
    fn test_product_url_encodes_barcode() {
        let client = OpenFoodFactsClient::new("http://localhost:9000/", "test-agent");
        assert_eq!(
            client.product_url("3017 620"),
            "http://localhost:9000/api/v0/product/3017%20620.json"
        );
    }

    #[tokio::test]
    async fn test_static_source() {
        let info = ProductInfo {
            product_name: "Oat Bar".to_string(),
            brand: String::new(),
            image_url: String::new(),
            ingredients: vec!["oats".to_string()],
            ingredients_text: "Oats".to_string(),
        };
        let source = StaticProductSource::new(vec![("123".to_string(), info.clone())]);
        assert_eq!(source.fetch_product("123").await.unwrap(), Some(info));
        assert_eq!(source.fetch_product("999").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires network access to OpenFoodFacts
    async fn test_openfoodfacts_integration() {
        let client = OpenFoodFactsClient::new(DEFAULT_OFF_BASE_URL, "apexscan-test");
        let product = client.fetch_product("3017620422003").await;
        assert!(product.is_ok());
    }
}
