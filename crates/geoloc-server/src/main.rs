#![doc = include_str!("../README.md")]

mod server;

use anyhow::Context;
use clap::Parser;
use geoloc_core::{DocumentStore, Flows, TimeRandomIds};
use server::backend::{HttpGeocoder, MemoryCache, MemoryStore};
use server::config::{CliArgs, ServerConfig};
use server::telemetry::init_telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let provider = HttpGeocoder::new(
        config.geocoder_url.clone(),
        config.geocoder_api_key.clone(),
        config.geocoder_timeout,
    )?;
    let store = Arc::new(MemoryStore::new());
    store
        .ensure_collection()
        .await
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to prepare document store")?;
    let cache = Arc::new(MemoryCache::new());

    let flows = Flows::new(
        Arc::new(provider),
        store.clone(),
        cache.clone(),
        Arc::new(TimeRandomIds),
    );
    let app = server::http::router(flows, &config);

    let listener = TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;
    log_startup_info(&config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(
        stored = store.len(),
        cached = cache.len(),
        "Service shut down successfully"
    );
    providers.shutdown();
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    tracing::info!(
        geocoder = %config.geocoder_url,
        api_key = config.geocoder_api_key.is_some(),
        timeout = ?config.geocoder_timeout,
        cors = config.cors,
        "Starting geocoding service on {} under {}",
        config.server_addr,
        config.api_root()
    );
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
