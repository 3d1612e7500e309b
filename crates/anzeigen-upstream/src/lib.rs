//! Kleinanzeigen upstream client
//!
//! This crate provides the client for communicating with the upstream
//! classifieds API, handling retries with exponential backoff.

pub mod client;
pub mod error;

pub use client::{UpstreamClient, UpstreamClientConfig, backoff_delay};
pub use error::UpstreamError;
