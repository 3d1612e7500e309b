//! Category routes

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use anzeigen_core::Category;

use crate::error::ApiError;
use crate::state::AppState;

/// Response envelope for GET /categories
#[derive(Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<Category>,
}

/// GET /categories - tech categories only
async fn categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state
        .listings
        .categories()
        .await
        .map_err(|e| ApiError::upstream("Failed to load categories", e))?;

    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// Create category routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/categories", get(categories))
}
