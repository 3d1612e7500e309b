//! Upstream API client with retrying fetch

use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::UpstreamError;

/// Default base URL of the upstream classifieds API
pub const DEFAULT_BASE_URL: &str = "https://api.ebay-kleinanzeigen.de/api";
/// Browser-like user agent the upstream expects
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
/// Language preference sent with every request
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9";
/// Per-attempt request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
/// Attempts per fetch, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upstream client configuration
#[derive(Clone, Debug)]
pub struct UpstreamClientConfig {
    /// Base URL of the upstream API
    pub base_url: String,
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of attempts per fetch (at least 1)
    pub max_attempts: u32,
    /// User agent header value
    pub user_agent: String,
    /// Accept-Language header value
    pub accept_language: String,
}

impl Default for UpstreamClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// Delay before the attempt following a failed attempt `attempt` (0-based):
/// 1s, 2s, 4s, ... No jitter and no cap.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Upstream API client
pub struct UpstreamClient {
    config: UpstreamClientConfig,
    client: Client,
    headers: HeaderMap,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(config: UpstreamClientConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&config.user_agent)?,
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Created upstream client for {}", config.base_url);

        Ok(Self {
            config,
            client,
            headers,
        })
    }

    /// Search ads with the given query pairs
    pub async fn search_ads(&self, query: &[(String, String)]) -> Result<Value, UpstreamError> {
        let url = Url::parse_with_params(&format!("{}/ads", self.config.base_url), query)?;
        self.fetch_json(url).await
    }

    /// Get a single ad by id
    pub async fn ad_detail(&self, id: &str) -> Result<Value, UpstreamError> {
        let url = Url::parse(&format!("{}/ads/{}", self.config.base_url, id))?;
        self.fetch_json(url).await
    }

    /// Get the category tree
    pub async fn categories(&self) -> Result<Value, UpstreamError> {
        let url = Url::parse(&format!("{}/categories", self.config.base_url))?;
        self.fetch_json(url).await
    }

    /// Fetch a URL with bounded retries and exponential backoff.
    ///
    /// A transport failure or a non-2xx status fails the attempt; failed
    /// attempts are retried identically until `max_attempts` is reached,
    /// sleeping `2^attempt` seconds between attempts. The last failure is
    /// propagated unchanged.
    pub async fn fetch_json(&self, url: Url) -> Result<Value, UpstreamError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            debug!(
                "Fetching {} (attempt {}/{})",
                url,
                attempt + 1,
                max_attempts
            );

            match self.try_fetch(&url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Request to {} failed (attempt {}): {}", url, attempt + 1, e);

                    if attempt + 1 >= max_attempts || !e.is_retryable() {
                        return Err(e);
                    }

                    let delay = backoff_delay(attempt);
                    debug!("Backing off for {:?} before next attempt", delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One GET attempt: send, check status, decode the body
    async fn try_fetch(&self, url: &Url) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url.clone())
            .headers(self.headers.clone())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{Json, Router, routing::get};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn test_client(base_url: String, max_attempts: u32) -> UpstreamClient {
        UpstreamClient::new(UpstreamClientConfig {
            base_url,
            timeout_secs: 5,
            max_attempts,
            ..UpstreamClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(5), Duration::from_secs(32));
    }

    #[test]
    fn test_total_wait_before_exhaustion() {
        // A fetch with N attempts sleeps after every attempt but the last:
        // 1 + 2 + ... + 2^(N-2) seconds in total.
        let n = 4u32;
        let total: Duration = (0..n - 1).map(backoff_delay).sum();
        assert_eq!(total, Duration::from_secs(1 + 2 + 4));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let app = Router::new().route(
            "/ads",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"ok": true}))
                }
            }),
        );
        let base = spawn_upstream(app).await;

        let client = test_client(base, 3);
        let body = client.search_ads(&[]).await.unwrap();

        assert_eq!(body["ok"], json!(true));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_2xx_is_retried_then_propagated() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let app = Router::new().route(
            "/categories",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})))
                }
            }),
        );
        let base = spawn_upstream(app).await;

        let client = test_client(base, 2);
        let err = client.categories().await.unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        match err {
            UpstreamError::Http(e) => assert!(e.is_status()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_success_after_failed_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let app = Router::new().route(
            "/ads/{id}",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                    } else {
                        (StatusCode::OK, Json(json!({"id": "42", "title": "Laptop"})))
                    }
                }
            }),
        );
        let base = spawn_upstream(app).await;

        let client = test_client(base, 3);
        let body = client.ad_detail("42").await.unwrap();

        assert_eq!(body["title"], json!("Laptop"));
        // Succeeded on the second attempt, no further attempts after that
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_not_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let app = Router::new().route(
            "/categories",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "not json"
                }
            }),
        );
        let base = spawn_upstream(app).await;

        let client = test_client(base, 3);
        let err = client.categories().await.unwrap_err();

        // The attempt completed at the transport level, so it is terminal
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_query_pairs_are_encoded_into_the_url() {
        let app = Router::new().route(
            "/ads",
            get(
                |axum::extract::Query(params): axum::extract::Query<HashMap<String, String>>| async move {
                    Json(json!({"echo": params}))
                },
            ),
        );
        let base = spawn_upstream(app).await;

        let client = test_client(base, 1);
        let pairs = vec![
            ("q".to_string(), "gaming laptop".to_string()),
            ("locationName".to_string(), "Berlin".to_string()),
        ];
        let body = client.search_ads(&pairs).await.unwrap();

        assert_eq!(body["echo"]["q"], json!("gaming laptop"));
        assert_eq!(body["echo"]["locationName"], json!("Berlin"));
    }
}
