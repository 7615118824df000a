use std::time::Duration;

use crate::resolver::ResolverConfig;

/// Default capacity for the job queue
pub const QUEUE_SIZE: usize = 100;

/// Default number of worker tasks draining the queue
pub const WORKER_COUNT: usize = 4;

/// Configuration for the API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Configuration for the resolution service client
    pub resolver: ResolverConfig,

    /// End-to-end timeout for one clean-text request
    pub request_timeout: Duration,

    /// Number of worker tasks
    pub worker_count: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            request_timeout: Duration::from_secs(60),
            worker_count: WORKER_COUNT,
        }
    }
}
