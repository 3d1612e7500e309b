//! Anzeigen Gateway REST API
//!
//! This crate provides the Axum-based HTTP surface: the listing routes,
//! the `{success, ...}` response envelopes, rate limiting, and metrics.

pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
