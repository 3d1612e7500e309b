//! Service metadata route

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Service description returned at the root
#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub search: String,
    pub ad: String,
    pub categories: String,
    pub health: String,
}

/// GET / - service metadata and endpoint listing
async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Kleinanzeigen Technik API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: Endpoints {
            search: "/search?q=technik&locationName=Berlin".to_string(),
            ad: "/ad/{id}".to_string(),
            categories: "/categories".to_string(),
            health: "/health".to_string(),
        },
    })
}

/// Create metadata routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}
