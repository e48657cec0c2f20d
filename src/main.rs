use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod config;
mod pandascore;
mod scheduler;
mod server;
mod store;
mod tracker;

use config::Config;
use pandascore::PandaScoreClient;
use server::AppState;
use store::CacheStore;
use tracker::engine::TrackerEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;
    let tz = config.timezone()?;

    if config.pandascore_api_key.is_none() {
        tracing::warn!("PANDASCORE_API_KEY not set, the tracker will serve cached data only");
    }

    // Open cache store
    let store = CacheStore::open(&config.cache_path)?;
    info!("Cache store opened: {}", config.cache_path);

    // Build provider client and engine
    let client = PandaScoreClient::new(config.pandascore_api_key.clone(), None)?;
    let engine = Arc::new(TrackerEngine::new(
        Arc::new(client),
        store,
        tz,
        config.tracked_limit,
    ));

    // Restore cached matches, or fetch an initial list
    engine.load_or_refresh().await;

    // Schedule the recurring refresh and update jobs
    scheduler::start_scheduler(
        Arc::clone(&engine),
        tz,
        config.refresh_hour,
        Duration::from_secs(config.update_interval_mins * 60),
    );

    // Start the widget API server
    let state = AppState {
        engine: Arc::clone(&engine),
        update_interval_mins: config.update_interval_mins,
    };
    let app = server::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush the tracked set one last time before exiting
    engine.persist();
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
