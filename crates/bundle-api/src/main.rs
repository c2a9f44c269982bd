//! Bundle API - HTTP service over captured support bundles
//!
//! Serves read-only queries against support-bundle archives stored in the
//! configured upload directory.

use anyhow::Result;
use bundle_lib::observability::{BundleMetrics, StructuredLogger};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting bundle-api");

    let config = config::ApiConfig::load()?;
    info!(
        api_port = config.api_port,
        upload_dir = %config.upload_dir.display(),
        assets_dir = %config.assets_dir.display(),
        "Bundle API configured"
    );

    let metrics = BundleMetrics::new();
    let logger = StructuredLogger::new("bundle-api");
    logger.log_startup(SERVICE_VERSION, &config.upload_dir.display().to_string());

    let port = config.api_port;
    let app_state = Arc::new(api::AppState::new(config, metrics, logger.clone()));

    tokio::select! {
        result = api::serve(port, app_state) => {
            if let Err(e) = &result {
                error!(error = %e, "API server stopped");
            }
            logger.log_shutdown("server exited");
            result
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
            info!("Shutting down");
            Ok(())
        }
    }
}
