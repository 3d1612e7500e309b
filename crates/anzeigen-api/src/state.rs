//! Application state

use anzeigen_core::ListingService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<ListingService>,
    /// Process start, for the health endpoint's uptime
    pub started_at: Instant,
}

impl AppState {
    pub fn new(listings: Arc<ListingService>) -> Self {
        Self {
            listings,
            started_at: Instant::now(),
        }
    }
}

/// Handle for rendering Prometheus metrics
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}
