use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::{ResolutionOutcome, ResolverClient};

impl ResolverClient {
    /// Resolves a batch of URLs concurrently, returning one outcome per
    /// input in input order.
    ///
    /// Every resolution is started concurrently (capped by the configured
    /// `max_concurrent`) and the batch settles only once every task has
    /// finished. Failures are isolated per URL: a failed or panicked task
    /// becomes a failure outcome at its input's index and never disturbs its
    /// siblings. The batch call itself cannot fail.
    ///
    /// # Arguments
    /// * `urls` - URLs to resolve; an empty slice returns an empty vector
    ///   without touching the network
    ///
    /// # Returns
    /// * `Vec<ResolutionOutcome>` - One settled outcome per input URL
    pub async fn expand_urls(&self, urls: &[String]) -> Vec<ResolutionOutcome> {
        if urls.is_empty() {
            debug!("Empty URL batch, nothing to resolve");
            return Vec::new();
        }

        debug!(
            "Expanding batch of {} URL(s) with max concurrency {}",
            urls.len(),
            self.config.max_concurrent
        );

        // Use an Arc<Semaphore> to share the concurrency cap between tasks
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let client = self.clone();
            let url = url.clone();
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ResolutionOutcome::failure(
                            url,
                            "resolution batch was shut down".to_string(),
                        )
                    }
                };

                match client.resolve(&url).await {
                    Ok(resolved) => ResolutionOutcome::success(url, resolved),
                    Err(e) => {
                        warn!("Resolution failed for {}: {}", url, e);
                        ResolutionOutcome::failure(url, e.to_string())
                    }
                }
            }));
        }

        // Settle every task, then collect by original index so the outcome
        // sequence mirrors the input sequence regardless of completion order.
        let settled = futures::future::join_all(handles).await;
        let mut outcomes = Vec::with_capacity(urls.len());
        for (index, result) in settled.into_iter().enumerate() {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!("Resolution task for {} did not complete: {}", urls[index], e);
                    outcomes.push(ResolutionOutcome::failure(
                        urls[index].clone(),
                        format!("resolution task did not complete: {}", e),
                    ));
                }
            }
        }

        info!(
            "Batch complete: {}/{} URL(s) resolved",
            outcomes.iter().filter(|outcome| outcome.is_resolved()).count(),
            outcomes.len()
        );
        outcomes
    }
}
