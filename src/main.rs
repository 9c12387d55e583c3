//! SUREBET — sports-odds arbitrage scanner and API service.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the key ring and vendor client, and serves the odds API
//! with graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use surebet::cache::ResponseCache;
use surebet::config::AppConfig;
use surebet::server;
use surebet::server::routes::ServiceState;
use surebet::vendor::keys::KeyRing;
use surebet::vendor::odds_api::OddsApiClient;
use surebet::vendor::OddsFeed;

const BANNER: &str = r#"
 ____  _   _ ____  _____ ____  _____ _____
/ ___|| | | |  _ \| ____| __ )| ____|_   _|
\___ \| | | | |_) |  _| |  _ \|  _|   | |
 ___) | |_| |  _ <| |___| |_) | |___  | |
|____/ \___/|_| \_\_____|____/|_____| |_|

  Split the stake. Lock the profit.
  v0.1.0 — Odds API service
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        port = cfg.service.port,
        cache_ttl_secs = cfg.service.cache_ttl_secs,
        total_stake = cfg.service.total_stake,
        bookmakers = cfg.vendor.bookmakers.len(),
        "SUREBET starting up"
    );

    // -- Initialise components -------------------------------------------

    let keys = Arc::new(KeyRing::from_env(&cfg.vendor.api_keys_env)?);
    info!(keys = keys.len(), "Key ring loaded");

    let client = OddsApiClient::new(
        keys,
        cfg.vendor.bookmakers.clone(),
        cfg.vendor.timeout_secs,
    )?
    .with_base_url(cfg.vendor.base_url.clone());

    let feed: Arc<dyn OddsFeed> = Arc::new(client);

    let state = Arc::new(ServiceState {
        feed,
        cache: ResponseCache::new(cfg.service.cache_ttl_secs),
        total_stake: cfg.service.total_stake,
    });

    let app = server::build_router(state);

    // -- Serve -----------------------------------------------------------

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.service.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(port = cfg.service.port, "Serving on http://localhost:{}", cfg.service.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SUREBET shut down cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("surebet=info"));

    let json_logging = std::env::var("SUREBET_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
