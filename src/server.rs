//! HTTP server for ingredient scoring and barcode lookups

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::{ApexError, Mode, ProductResponse, ScoreResult, SharedProductService};

/// Body of `POST /scan`
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Query of `GET /product/:barcode`
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub mode: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: &str, details: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details: Some(details.into()),
        }),
    )
}

/// Score an ingredient list
async fn scan_handler(
    State(service): State<SharedProductService>,
    Json(req): Json<ScanRequest>,
) -> Json<ScoreResult> {
    let mode = Mode::parse_lossy(req.mode.as_deref());
    info!(
        "Received scan request: {} ingredients, mode={}",
        req.ingredients.len(),
        mode
    );

    let result = service.scan(&req.ingredients, mode);
    info!("Scan scored {:.1} ({})", result.final_score, result.verdict);

    Json(result)
}

/// Look up and score a product by barcode
async fn product_handler(
    State(service): State<SharedProductService>,
    Path(barcode): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<ProductResponse>, ApiError> {
    let mode = Mode::parse_lossy(query.mode.as_deref());
    info!("Received product lookup: barcode={}, mode={}", barcode, mode);

    match service.lookup(&barcode, mode).await {
        Ok(response) => Ok(Json(response)),
        Err(ApexError::NotFound(what)) => Err(api_error(
            StatusCode::NOT_FOUND,
            "Product not found",
            what,
        )),
        Err(e) => {
            error!("Product lookup failed: {:?}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Product lookup failed",
                e.to_string(),
            ))
        }
    }
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "apexscan".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create and configure the HTTP router
pub fn create_router(service: SharedProductService) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/scan", post(scan_handler))
        .route("/product/:barcode", get(product_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(service)
}

/// Run the HTTP server
pub async fn run_server(service: SharedProductService, addr: &str) -> anyhow::Result<()> {
    info!("Starting apexscan server on {}", addr);

    let app = create_router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileProductCache, ProductInfo, ProductService, ScoringEngine, StaticProductSource};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn service() -> SharedProductService {
        let bar = ProductInfo {
            product_name: "Whey Bar".to_string(),
            brand: "Acme".to_string(),
            image_url: String::new(),
            ingredients: vec!["whey protein".to_string(), "oats".to_string()],
            ingredients_text: "Whey protein, oats".to_string(),
        };
        ProductService::new(
            Arc::new(ScoringEngine::default()),
            Box::new(StaticProductSource::new(vec![("4001".to_string(), bar)])),
            Box::new(FileProductCache::in_memory()),
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = create_router(service())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_scan_endpoint() {
        let request = Request::post("/scan")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"ingredients": ["Whey Protein", "Oats"], "mode": "bulk"}"#))
            .unwrap();

        let response = create_router(service()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        // 40 (capped whey) + 5 * 0.85 (oats fuel) = 44.25, a tie that rounds to even
        assert_eq!(json["final_score"], 44.2);
        assert_eq!(json["verdict"], "⚠️ Mediocre");
        assert_eq!(json["good_ingredients"][0], "Whey Protein (+40.0)");
        assert_eq!(json["good_ingredients"][1], "Oats (Fuel)");
        assert!(json["analysis_log"].as_array().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn test_scan_defaults_mode_to_bulk() {
        let request = Request::post("/scan")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"ingredients": ["Sugar"]}"#))
            .unwrap();

        let json = body_json(create_router(service()).oneshot(request).await.unwrap()).await;
        assert_eq!(json["good_ingredients"][0], "Sugar (Fuel)");
    }

    #[tokio::test]
    async fn test_product_lookup_then_cache() {
        let router = create_router(service());

        let first = router
            .clone()
            .oneshot(Request::get("/product/4001").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let first = body_json(first).await;
        assert_eq!(first["source"], "live");
        assert_eq!(first["name"], "Whey Bar");
        assert_eq!(first["ingredients_text"], "whey protein, oats");
        assert_eq!(first["apex_score"], 44.2);
        assert!(first["analysis"].is_object());

        let second = router
            .oneshot(Request::get("/product/4001?mode=CUT").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let second = body_json(second).await;
        assert_eq!(second["source"], "cache");
        // Served from cache, so the CUT mode does not rescore
        assert_eq!(second["apex_score"], 44.2);
        assert!(second.get("analysis").is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_is_404() {
        let response = create_router(service())
            .oneshot(Request::get("/product/0000").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Product not found");
    }
}
