//! Fixed-window rate limiting middleware

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// One client's current window
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client IP.
///
/// A client's window opens on its first request and resets once the window
/// duration has elapsed; requests beyond `max_requests` within an open
/// window are rejected.
pub struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Admit or reject one request from `client`, counting it when admitted
    pub fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock();
        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// Middleware rejecting requests over the per-client limit
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check(addr.ip()) {
        next.run(request).await
    } else {
        warn!("Rate limit exceeded for {}", addr.ip());
        metrics::counter!("anzeigen_gateway_rate_limited_total").increment(1);

        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "error": "Too many requests, please try again later",
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_over_the_limit_are_rejected() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let client: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.check(client));
        assert!(limiter.check(client));
        assert!(!limiter.check(client));
        assert!(!limiter.check(client));
    }

    #[test]
    fn test_clients_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(first));
        assert!(!limiter.check(first));
        assert!(limiter.check(second));
    }

    #[test]
    fn test_a_fresh_window_admits_again() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        let client: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.check(client));
        assert!(!limiter.check(client));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check(client));
    }
}
