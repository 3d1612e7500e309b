//! Anzeigen Gateway - thin proxy for the Kleinanzeigen classifieds API

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use anzeigen_api::{AppState, MetricsHandle, RateLimiter, create_router};
use anzeigen_core::ListingService;
use anzeigen_upstream::{UpstreamClient, UpstreamClientConfig};
use config::{Config, LoggingConfig};

/// Anzeigen Gateway - thin proxy for the Kleinanzeigen classifieds API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "ANZEIGEN_GATEWAY_BIND")]
    bind: Option<String>,

    /// Port (the hosting platform sets PORT)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Anzeigen Gateway v{}", env!("CARGO_PKG_VERSION"));

    // The recorder must be installed before any counter is touched
    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Initialize upstream client
    let upstream = Arc::new(UpstreamClient::new(UpstreamClientConfig {
        base_url: config.upstream.base_url.clone(),
        timeout_secs: config.upstream.timeout_secs,
        max_attempts: config.upstream.max_attempts,
        user_agent: config.upstream.user_agent.clone(),
        accept_language: config.upstream.accept_language.clone(),
    })?);

    // Initialize listing service
    let listings = Arc::new(ListingService::new(upstream));

    // Rate limiter, unless disabled
    let limiter = config.rate_limit.enabled.then(|| {
        Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ))
    });

    // Create application state
    let state = AppState::new(listings);

    // Create router
    let app = create_router(state, limiter, Some(Arc::new(MetricsHandle::new(prometheus))))
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Upstream: {}", config.upstream.base_url);

    // Start server; connect info is needed for per-client rate limiting
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
