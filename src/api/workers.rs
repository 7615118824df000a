use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, trace, warn};

use crate::api::config::ApiConfig;
use crate::api::models::CleanTextJob;
use crate::api::processor::process_request;
use crate::resolver::ResolverClient;

/// Shared counters backing the health endpoint
#[derive(Debug)]
pub struct WorkerMetrics {
    pub active_jobs: AtomicUsize,
    pub processed_jobs: AtomicUsize,
    started_at: Instant,
}

impl WorkerMetrics {
    pub fn new() -> Self {
        Self {
            active_jobs: AtomicUsize::new(0),
            processed_jobs: AtomicUsize::new(0),
            started_at: Instant::now(),
        }
    }

    /// Time elapsed since the worker pool started
    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl Default for WorkerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Starts worker tasks to process jobs from the queue
///
/// Each worker pulls jobs from the shared queue, runs the clean-text pipeline
/// and reports back through the job's response channel.
///
/// # Arguments
/// * `job_rx` - Job receiver channel, shared between all workers
/// * `resolver` - Shared resolution service client
/// * `metrics` - Shared counters for the health endpoint
/// * `config` - API configuration
pub async fn start_workers(
    job_rx: mpsc::Receiver<CleanTextJob>,
    resolver: Arc<ResolverClient>,
    metrics: Arc<WorkerMetrics>,
    config: ApiConfig,
) {
    // Wrap the job receiver in a mutex so multiple workers can share it
    let job_rx = Arc::new(Mutex::new(job_rx));

    info!("Spawning {} worker task(s)", config.worker_count);

    for worker_id in 0..config.worker_count {
        let resolver = resolver.clone();
        let job_rx = job_rx.clone();
        let metrics = metrics.clone();
        let config = config.clone();

        tokio::spawn(async move {
            debug!("Worker {} started", worker_id);
            loop {
                trace!("Worker {} waiting for job", worker_id);
                let job_opt = { job_rx.lock().await.recv().await };

                match job_opt {
                    Some(job) => {
                        debug!(
                            "Worker {} processing job ({} bytes of text)",
                            worker_id,
                            job.request.text.len()
                        );
                        metrics.active_jobs.fetch_add(1, Ordering::SeqCst);

                        let result = process_request(job.request, &config, resolver.clone()).await;

                        metrics.active_jobs.fetch_sub(1, Ordering::SeqCst);
                        metrics.processed_jobs.fetch_add(1, Ordering::SeqCst);

                        match &result {
                            Ok(_) => debug!("Worker {} completed job successfully", worker_id),
                            Err(e) => warn!("Worker {} job failed: {}", worker_id, e),
                        }

                        if job.response_tx.send(result.map_err(|e| e.to_string())).is_err() {
                            warn!("Worker {} failed to send response - receiver dropped", worker_id);
                        }
                    }
                    None => {
                        info!("Worker {} shutting down - channel closed", worker_id);
                        break;
                    }
                }
            }
        });
    }
}
