use actix_web::{web, HttpResponse, Responder};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};

use crate::api::config::ApiConfig;
use crate::api::models::{CleanTextJob, CleanTextRequest, ErrorResponse, HealthStatus};
use crate::api::workers::WorkerMetrics;

// Largest accepted text body, in bytes
const MAX_TEXT_LENGTH: usize = 64 * 1024;

/// HTTP handler for clean-text requests
///
/// Validates the request, submits it to the worker queue, and awaits the
/// result with a timeout. A briefly full queue is retried before the request
/// is rejected.
///
/// # Arguments
/// * `request` - JSON request containing the text to clean
/// * `config` - API configuration
/// * `job_tx` - Job queue sender
///
/// # Returns
/// * HTTP response with the rewritten text and per-URL reports, or error
///   information
#[instrument(skip_all, fields(text_len = request.text.len()))]
pub async fn clean_text_handler(
    request: web::Json<CleanTextRequest>,
    config: web::Data<ApiConfig>,
    job_tx: web::Data<mpsc::Sender<CleanTextJob>>,
) -> impl Responder {
    info!("Received clean-text request ({} bytes)", request.text.len());

    // Input validation
    if request.text.trim().is_empty() {
        warn!("Rejected empty text body");
        return HttpResponse::BadRequest().json(ErrorResponse {
            status: "error".to_string(),
            message: "Text must not be empty".to_string(),
        });
    }
    if request.text.len() > MAX_TEXT_LENGTH {
        warn!(
            "Rejected oversized text body: {} > {} bytes",
            request.text.len(),
            MAX_TEXT_LENGTH
        );
        return HttpResponse::BadRequest().json(ErrorResponse {
            status: "error".to_string(),
            message: format!("Text exceeds maximum length of {} bytes", MAX_TEXT_LENGTH),
        });
    }

    // Try to enqueue the job with a brief retry strategy
    debug!("Attempting to enqueue clean-text job");

    let max_attempts = 3;
    let retry_delay = Duration::from_millis(100);
    let mut attempts = 0;
    let request = request.into_inner();

    while attempts < max_attempts {
        // Create a new channel for each attempt
        let (response_tx, response_rx) = oneshot::channel();

        let job = CleanTextJob {
            request: request.clone(),
            response_tx,
        };

        match job_tx.try_send(job) {
            Ok(_) => {
                debug!("Job successfully enqueued after {} attempt(s)", attempts + 1);

                // Wait for the result
                debug!("Waiting for result with timeout: {:?}", config.request_timeout);
                return match timeout(config.request_timeout, response_rx).await {
                    Ok(Ok(Ok(response))) => {
                        info!("Clean-text request completed successfully");
                        HttpResponse::Ok().json(response)
                    }
                    Ok(Ok(Err(e))) => {
                        error!("Clean-text request failed: {}", e);
                        HttpResponse::InternalServerError().json(ErrorResponse {
                            status: "error".to_string(),
                            message: e,
                        })
                    }
                    Ok(Err(_)) => {
                        error!("Worker channel closed unexpectedly");
                        HttpResponse::InternalServerError().json(ErrorResponse {
                            status: "error".to_string(),
                            message: "Worker dropped.".to_string(),
                        })
                    }
                    Err(_) => {
                        error!("Request timed out after {:?}", config.request_timeout);
                        HttpResponse::RequestTimeout().json(ErrorResponse {
                            status: "error".to_string(),
                            message: "Request timed out.".to_string(),
                        })
                    }
                };
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                attempts += 1;
                if attempts < max_attempts {
                    warn!("Queue full, retrying (attempt {}/{})", attempts, max_attempts);
                    sleep(retry_delay).await;
                } else {
                    warn!("Queue full after {} attempts, rejecting request", max_attempts);
                    return HttpResponse::TooManyRequests().json(ErrorResponse {
                        status: "error".to_string(),
                        message: "Server is busy, try again later.".to_string(),
                    });
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Worker queue has been closed!");
                return HttpResponse::ServiceUnavailable().json(ErrorResponse {
                    status: "error".to_string(),
                    message: "Service is shutting down or unavailable.".to_string(),
                });
            }
        }
    }

    // This should never be reached because we either return success or error
    // inside the loop
    error!("Unexpected code path in clean_text_handler");
    HttpResponse::InternalServerError().json(ErrorResponse {
        status: "error".to_string(),
        message: "Internal error in request handling.".to_string(),
    })
}

/// Health check endpoint for monitoring service status
///
/// Reports worker pool utilization and total processed jobs.
///
/// # Arguments
/// * `metrics` - Shared worker metrics
/// * `config` - API configuration
///
/// # Returns
/// * HTTP response with health status information
#[instrument(skip_all)]
pub async fn health_check(
    metrics: web::Data<Arc<WorkerMetrics>>,
    config: web::Data<ApiConfig>,
) -> impl Responder {
    debug!("Processing health check request");

    let active = metrics.active_jobs.load(Ordering::SeqCst);
    let processed = metrics.processed_jobs.load(Ordering::SeqCst);

    let status = if active < config.worker_count {
        "healthy"
    } else {
        "degraded"
    };

    info!(
        "Health check: status={}, active={}/{}",
        status, active, config.worker_count
    );
    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        active_jobs: active,
        worker_count: config.worker_count,
        processed_jobs: processed,
        uptime: metrics.uptime(),
    })
}
