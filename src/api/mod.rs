pub mod config;
pub mod handlers;
pub mod models;
pub mod processor;
pub mod workers;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::api::config::{ApiConfig, QUEUE_SIZE};
use crate::api::handlers::{clean_text_handler, health_check};
use crate::api::models::CleanTextJob;
use crate::api::workers::{start_workers, WorkerMetrics};
use crate::resolver::ResolverClient;

/// Starts the API server with the specified configuration
///
/// Initializes the resolver client, sets up the worker pool, and starts the
/// HTTP server with the configured endpoints.
///
/// # Arguments
/// * `host` - Host address to bind to (e.g., "127.0.0.1")
/// * `port` - Port to listen on
/// * `config` - Optional API configuration (uses defaults if None)
///
/// # Returns
/// * `Result<()>` - Success or an error
#[instrument(skip(config))]
pub async fn start_server(host: &str, port: u16, config: Option<ApiConfig>) -> Result<()> {
    info!("Starting linkclean API server on {}:{}", host, port);

    let config = config.unwrap_or_else(|| {
        debug!("Using default API configuration");
        ApiConfig::default()
    });

    debug!(
        "Initializing resolver client for endpoint: {}",
        config.resolver.endpoint
    );
    let resolver = Arc::new(
        ResolverClient::new(config.resolver.clone())
            .context("Failed to initialize resolver client")?,
    );
    let metrics = Arc::new(WorkerMetrics::new());

    // Create the job queue
    debug!("Creating job queue with capacity: {}", QUEUE_SIZE);
    let (job_tx, job_rx) = mpsc::channel::<CleanTextJob>(QUEUE_SIZE);

    start_workers(job_rx, resolver.clone(), metrics.clone(), config.clone()).await;

    let job_tx_data = web::Data::new(job_tx);
    let config_data = web::Data::new(config.clone());
    let metrics_data = web::Data::new(metrics);

    info!("Starting HTTP server at {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(job_tx_data.clone())
            .app_data(metrics_data.clone())
            .service(web::resource("/clean").route(web::post().to(clean_text_handler)))
            .service(web::resource("/health").route(web::get().to(health_check)))
    })
    .bind((host, port))
    .map_err(|e| {
        error!("Failed to bind to {}:{}: {}", host, port, e);
        e
    })?
    .run()
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
