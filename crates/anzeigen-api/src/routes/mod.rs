//! API routes

mod categories;
mod health;
mod listings;
mod meta;
pub mod metrics;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::rate_limit::{self, RateLimiter};
use crate::state::{AppState, MetricsHandle};

/// Uniform envelope for anything that escapes the routes
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Not found" })),
    )
        .into_response()
}

/// Create the main router
pub fn create_router(
    state: AppState,
    limiter: Option<Arc<RateLimiter>>,
    metrics_handle: Option<Arc<MetricsHandle>>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Service metadata
        .merge(meta::routes())
        // Health check
        .merge(health::routes())
        // Listing API
        .merge(listings::routes())
        .merge(categories::routes())
        .with_state(state);

    // Rate limiting covers the listing surface, not metrics
    if let Some(limiter) = limiter {
        router = router.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ));
    }

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.layer(cors).fallback(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use axum::routing::get;
    use serde_json::Value;
    use tower::ServiceExt;

    use anzeigen_core::ListingService;
    use anzeigen_upstream::{UpstreamClient, UpstreamClientConfig};

    async fn mock_upstream() -> String {
        let app = Router::new()
            .route(
                "/ads",
                get(|| async {
                    Json(json!({
                        "_embedded": {
                            "ads": [
                                {
                                    "id": 1,
                                    "title": "Monitor",
                                    "price": { "display": "80 €" }
                                },
                                { "id": 2, "title": "Tastatur" }
                            ]
                        }
                    }))
                }),
            )
            .route(
                "/ads/{id}",
                get(|| async {
                    Json(json!({
                        "id": "42",
                        "title": "Laptop",
                        "description": "Kaum benutzt",
                        "seller": { "name": "Alice", "type": "PRIVATE" }
                    }))
                }),
            )
            .route(
                "/categories",
                get(|| async {
                    Json(json!({
                        "_embedded": {
                            "categories": [
                                { "name": "Elektronik", "id": 161 },
                                { "name": "Haus & Garten", "id": 80 }
                            ]
                        }
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn app_for(base_url: String) -> Router {
        let client = UpstreamClient::new(UpstreamClientConfig {
            base_url,
            timeout_secs: 5,
            max_attempts: 1,
            ..UpstreamClientConfig::default()
        })
        .unwrap();
        let state = AppState::new(Arc::new(ListingService::new(Arc::new(client))));
        create_router(state, None, None)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_search_returns_envelope_with_query_echo() {
        let app = app_for(mock_upstream().await);

        let (status, body) = get_json(&app, "/search?limit=5&q=laptop").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["count"], json!(2));
        assert_eq!(body["results"][0]["price"], json!("80 €"));
        assert_eq!(body["query"], json!({ "q": "laptop", "limit": "5" }));
    }

    #[tokio::test]
    async fn test_search_without_params_echoes_empty_query() {
        let app = app_for(mock_upstream().await);

        let (status, body) = get_json(&app, "/search").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], json!({}));
    }

    #[tokio::test]
    async fn test_ad_detail_is_flattened_into_the_envelope() {
        let app = app_for(mock_upstream().await);

        let (status, body) = get_json(&app, "/ad/42").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["title"], json!("Laptop"));
        assert_eq!(body["seller"]["name"], json!("Alice"));
        assert_eq!(body["seller"]["type"], json!("PRIVATE"));
        assert_eq!(body["url"], json!("#"));
    }

    #[tokio::test]
    async fn test_categories_are_filtered() {
        let app = app_for(mock_upstream().await);

        let (status, body) = get_json(&app, "/categories").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"].as_array().unwrap().len(), 1);
        assert_eq!(body["categories"][0]["name"], json!("Elektronik"));
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_500_envelope() {
        // Nothing is listening on this port
        let app = app_for("http://127.0.0.1:1".to_string());

        let (status, body) = get_json(&app, "/search").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_reports_non_decreasing_uptime() {
        let app = app_for(mock_upstream().await);

        let (status, first) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], json!("OK"));

        let (_, second) = get_json(&app, "/health").await;
        assert!(second["uptime"].as_f64().unwrap() >= first["uptime"].as_f64().unwrap());
    }

    #[tokio::test]
    async fn test_unmatched_path_gets_the_envelope() {
        let app = app_for(mock_upstream().await);

        let (status, body) = get_json(&app, "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let app = app_for(mock_upstream().await);

        let (status, body) = get_json(&app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["search"], json!("/search?q=technik&locationName=Berlin"));
        assert_eq!(body["endpoints"]["health"], json!("/health"));
    }
}
