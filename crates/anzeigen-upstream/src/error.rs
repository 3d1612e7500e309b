//! Upstream client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl UpstreamError {
    /// Whether a failed attempt may be tried again.
    ///
    /// Transport failures (connect, timeout, request) and non-2xx statuses
    /// are retryable; a 2xx response whose body fails to decode is not,
    /// since the attempt itself completed.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Http(e) => !(e.is_decode() || e.is_builder()),
            _ => false,
        }
    }
}
