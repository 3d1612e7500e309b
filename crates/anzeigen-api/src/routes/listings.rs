//! Search and ad-detail routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;
use tracing::debug;

use anzeigen_core::{AdDetail, AdSummary, SearchParams};

use crate::error::ApiError;
use crate::state::AppState;

/// Response envelope for GET /search
#[derive(Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub results: Vec<AdSummary>,
    /// Echo of the caller's parameters, defaults not filled in
    pub query: SearchParams,
}

/// Response envelope for GET /ad/{id}; ad fields sit at the top level
/// next to the success flag
#[derive(Serialize)]
pub struct AdResponse {
    pub success: bool,
    #[serde(flatten)]
    pub ad: AdDetail,
}

/// GET /search
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    debug!("Search parameters: {:?}", params);
    metrics::counter!("anzeigen_gateway_searches_total").increment(1);

    let results = state
        .listings
        .search(&params)
        .await
        .map_err(|e| ApiError::upstream("Failed to load search results", e))?;

    Ok(Json(SearchResponse {
        success: true,
        count: results.len(),
        results,
        query: params,
    }))
}

/// GET /ad/{id}
async fn ad_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AdResponse>, ApiError> {
    debug!("Loading ad details for id: {}", id);
    metrics::counter!("anzeigen_gateway_ad_lookups_total").increment(1);

    let ad = state
        .listings
        .ad_detail(&id)
        .await
        .map_err(|e| ApiError::upstream("Failed to load ad details", e))?;

    Ok(Json(AdResponse { success: true, ad }))
}

/// Create listing routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/ad/{id}", get(ad_detail))
}
