//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] anzeigen_upstream::UpstreamError),
}
