//! Main Entrypoint for the Math Bot API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the record-store and answer-model clients.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use mathbot_api::{config::Config, orchestrator::Orchestrator, router::create_router, state::AppState};
use mathbot_core::{
    judge::{AnswerJudge, HttpAnswerJudge},
    store::{HttpRecordStore, RecordStore},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Upstream Clients ---
    let store: Arc<dyn RecordStore> = Arc::new(
        HttpRecordStore::new(config.store_url.clone(), config.rpc_timeout)
            .context("Failed to build record-store client")?,
    );
    let judge: Arc<dyn AnswerJudge> = Arc::new(
        HttpAnswerJudge::new(
            config.judge_url.clone(),
            config.similarity_threshold,
            config.rpc_timeout,
        )
        .context("Failed to build answer-model client")?,
    );

    let app_state = Arc::new(AppState {
        orchestrator: Arc::new(Orchestrator::new(store, judge)),
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        store_url = %config.store_url,
        judge_url = %config.judge_url,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
