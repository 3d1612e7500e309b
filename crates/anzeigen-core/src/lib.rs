//! Anzeigen Gateway domain layer
//!
//! Search-query defaulting, the mapping boundary between the upstream
//! payloads and the simplified listing schema, and the service that
//! orchestrates the upstream client.

pub mod error;
pub mod mapping;
pub mod models;
pub mod query;
pub mod service;

pub use error::CoreError;
pub use models::{AdDetail, AdSummary, Category, Seller};
pub use query::SearchParams;
pub use service::ListingService;
