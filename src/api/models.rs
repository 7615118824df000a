use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::resolver::ResolutionOutcome;

/// Request to clean a block of pasted text
#[derive(Debug, Deserialize, Clone)]
pub struct CleanTextRequest {
    /// Free-form text, possibly containing URLs
    pub text: String,
}

/// Internal job structure for text-cleaning tasks
#[derive(Debug)]
pub struct CleanTextJob {
    /// The clean-text request
    pub request: CleanTextRequest,

    /// Sender for the response channel
    pub response_tx: oneshot::Sender<Result<CleanTextResponse, String>>,
}

/// Per-URL outcome included in a clean-text response
#[derive(Debug, Serialize, Clone)]
pub struct UrlReport {
    /// The URL as it appeared in the text
    pub original: String,

    /// Final destination, when resolution succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<String>,

    /// Every intermediate URL the service passed through
    pub redirect_chain: Vec<String>,

    /// Number of redirects followed
    pub redirect_count: usize,

    /// Destination page title, when the service reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Outcome status: resolved or failed
    pub status: String,

    /// Failure detail, when resolution failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&ResolutionOutcome> for UrlReport {
    fn from(outcome: &ResolutionOutcome) -> Self {
        match &outcome.result {
            Some(resolved) => Self {
                original: outcome.original.clone(),
                expanded: Some(resolved.expanded.clone()),
                redirect_chain: resolved.redirect_chain.clone(),
                redirect_count: resolved.redirect_count,
                title: if resolved.title.is_empty() {
                    None
                } else {
                    Some(resolved.title.clone())
                },
                status: "resolved".to_string(),
                message: None,
            },
            None => Self {
                original: outcome.original.clone(),
                expanded: None,
                redirect_chain: Vec::new(),
                redirect_count: 0,
                title: None,
                status: "failed".to_string(),
                message: outcome.error.clone(),
            },
        }
    }
}

/// Response for a clean-text request
#[derive(Debug, Serialize, Clone)]
pub struct CleanTextResponse {
    /// The text as submitted
    pub original_text: String,

    /// The text with every resolvable URL replaced by its cleaned destination
    pub cleaned_text: String,

    /// Number of URL occurrences found in the text
    pub urls_found: usize,

    /// Number of occurrences that resolved successfully
    pub urls_resolved: usize,

    /// Per-URL outcomes, in order of appearance
    pub urls: Vec<UrlReport>,

    /// Overall request status
    pub status: String,

    /// Optional message, usually describing partial failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CleanTextResponse {
    /// Create a new response for the given input text
    pub fn new(text: String) -> Self {
        Self {
            original_text: text.clone(),
            cleaned_text: text,
            urls_found: 0,
            urls_resolved: 0,
            urls: Vec::new(),
            status: "pending".to_string(),
            message: None,
        }
    }
}

/// Health status response for the /health endpoint
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Status indicator: healthy or degraded
    pub status: String,

    /// Number of jobs currently being processed
    pub active_jobs: usize,

    /// Number of worker tasks
    pub worker_count: usize,

    /// Total jobs processed since startup
    pub processed_jobs: usize,

    /// Server uptime in seconds
    pub uptime: std::time::Duration,
}

/// Error response for API endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Status indicator: error
    pub status: String,

    /// Error message details
    pub message: String,
}
