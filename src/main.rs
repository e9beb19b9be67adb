//! heartbeat: backend status card.
//!
//! This is the application entry point. It loads configuration, initializes
//! tracing, resolves the backend URL once, starts the health poller, sets up
//! the Axum router and serves until a shutdown signal arrives.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heartbeat::config::{AppConfig, DEFAULT_LOG_FILTER};
use heartbeat::http::{shutdown_signal, start_server};
use heartbeat::poller::{HttpHealthProbe, StatusPoller};
use heartbeat::routes::create_router;
use heartbeat::state::AppState;
use heartbeat::templates::init_templates;

/// heartbeat: A status card for a backend health endpoint
#[derive(Parser, Debug)]
#[command(name = "heartbeat", version, about)]
struct Args {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Backend base URL, overriding API_URL and the config file
    #[arg(short, long)]
    api_url: Option<String>,

    /// Log level filter (e.g., "heartbeat=info,reqwest=debug")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load_or_default(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(config = ?args.config, "Loaded configuration");

    // Resolved once; everything downstream receives the value
    let api_url = config
        .backend
        .resolve_api_url(args.api_url.as_deref(), |key| std::env::var(key).ok());
    let health_url = config.backend.health_url(&api_url);
    tracing::info!(
        api_url = %api_url,
        health_url = %health_url,
        interval_secs = config.backend.poll_interval_seconds,
        timeout_secs = config.backend.request_timeout_seconds,
        "Backend configured"
    );

    let probe = HttpHealthProbe::new(health_url, config.backend.request_timeout())?;
    let poller = StatusPoller::new(Arc::new(probe), config.backend.poll_interval());
    let board = poller.board();
    let poller = poller.spawn();

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    let http_config = config.http.clone();
    let state = AppState::new(config, tera, api_url, board);
    let app = create_router(state);

    let served = start_server(app, &http_config, shutdown_signal()).await;

    poller.shutdown().await;
    served?;

    Ok(())
}
