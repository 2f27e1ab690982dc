use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use dailydose_core::{build_pipeline, load_config, validate_config};
use dailydose_server::{api::create_router, logging, state::AppState};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "DAILYDOSE_CONFIG";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    logging::init("info,tower_http=debug");

    // Determine config path
    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Topic catalog: {:?}", config.topics.catalog_path);
    info!(
        "Publication ledger: {:?} ({:?})",
        config.topics.ledger_path(),
        config.topics.ledger_backend
    );

    // A pipeline that cannot be built still lets the server start; generate
    // requests report the reason.
    let pipeline = build_pipeline(&config);
    let state = AppState::new(config.clone(), pipeline);
    match state.pipeline() {
        Ok(pipeline) => info!(
            "Pipeline ready (run mode: {}, publisher: {})",
            state.run_mode().as_str(),
            if pipeline.can_publish() { "configured" } else { "not configured" }
        ),
        Err(unavailable) => warn!("Pipeline unavailable: {}", unavailable.message),
    }

    // Create router
    let app = create_router(Arc::new(state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
