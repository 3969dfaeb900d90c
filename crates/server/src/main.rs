//! Energy predictor server
//!
//! Loads the configured model once and serves predictions, health checks
//! and metrics over HTTP.

use anyhow::{Context, Result};
use energy_core::{
    health::{components, HealthRegistry},
    load_model, InferenceService, LoadDecomposer, ModelSlot, StructuredLogger,
};
use energy_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting energy-server");

    let config = ServerConfig::load()?;
    info!(
        api_port = config.api_port,
        model_format = ?config.model.format,
        tier_scheme = ?config.decomposer.tier_scheme,
        "Server configured"
    );

    let logger = StructuredLogger::new(&config.service_name);

    // A model that fails to load leaves the server up but unable to predict
    let model = match load_model(&config.model) {
        Ok(model) => ModelSlot::from(model),
        Err(e) => {
            error!(error = %e, "Failed to load model");
            ModelSlot::Unavailable(e.to_string())
        }
    };

    let decomposer =
        LoadDecomposer::with_config(config.decomposer).context("Invalid decomposer configuration")?;
    let service = InferenceService::new(model, decomposer).with_logger(logger.clone());

    let health_registry = HealthRegistry::new();
    health_registry.register(components::API).await;
    health_registry.record_model(service.model_slot()).await;

    let model_version = service
        .model_info()
        .map(|(version, _)| version)
        .unwrap_or_else(|| "none".to_string());
    logger.log_startup(SERVER_VERSION, &model_version);

    let app_state = Arc::new(api::AppState::new(
        service,
        health_registry.clone(),
        config.impact_weights,
    ));

    health_registry.set_ready(true).await;

    let shutdown_logger = logger.clone();
    api::serve(config.api_port, app_state, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        shutdown_logger.log_shutdown("SIGINT received");
        info!("Shutting down");
    })
    .await?;

    Ok(())
}
