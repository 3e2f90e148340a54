mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod store;
mod weather;
mod weather_client;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, IO_TIMEOUT, PORT};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::MongoWeatherStore;
use crate::weather_client::WeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Weather API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize MongoDB; any failure here is fatal
    let mongo = db::connect(&config.mongo_uri).await?;
    let store = MongoWeatherStore::new(
        &mongo.database(&config.mongo_database),
        &config.mongo_collection,
        IO_TIMEOUT,
    );
    store.ensure_indexes().await?;

    // Initialize weather provider client
    if config.api_key.trim().is_empty() {
        warn!("API_KEY is not set; the weather provider will likely reject every fetch");
    }
    let weather = WeatherClient::new(&config.base_url, &config.api_key, IO_TIMEOUT)?;
    info!("Weather provider client initialized ({})", config.base_url);

    let state = AppState {
        store: Arc::new(store),
        weather,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], PORT));
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing MongoDB connections");
    mongo.shutdown().await;

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
