mod batch;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::url_cleaner::clean_url;
use crate::utils::truncate_for_log;

// Constants for resolver configuration
const REQUEST_TIMEOUT: u64 = 30; // seconds
const CONNECTION_TIMEOUT: u64 = 10; // seconds
const MAX_CONCURRENT: usize = 8;
const ERROR_BODY_LIMIT: usize = 200; // characters kept from an error body

/// Configuration for the resolution service client
///
/// Allows customization of the remote endpoint, timeouts, connection pooling
/// and the concurrency cap used by batch expansion.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base URL of the resolution service; the target URL is appended as a
    /// `url` query parameter
    pub endpoint: String,

    // Timing
    pub request_timeout: Duration,
    pub connection_timeout: Duration,

    // HTTP client configuration
    pub user_agent: String,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,

    /// Maximum number of in-flight resolutions per batch
    pub max_concurrent: usize,
}

impl ResolverConfig {
    /// Creates a new resolver configuration with default values
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Sets the request timeout duration
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connection timeout for establishing new connections
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the maximum number of concurrent resolutions per batch
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://your-worker.your-subdomain.workers.dev/".to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT),
            connection_timeout: Duration::from_secs(CONNECTION_TIMEOUT),
            user_agent: "LinkCleanAPI/1.0".to_string(),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            max_concurrent: MAX_CONCURRENT,
        }
    }
}

/// Error raised when a single URL cannot be resolved
///
/// Callers running batches are expected to catch this per URL; one failed
/// resolution must never abort its siblings.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The service answered with a non-success status
    #[error("resolution service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The service could not be reached at all
    #[error("failed to reach resolution service: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered 2xx but the body was not the expected JSON
    #[error("resolution service returned an undecodable body: {0}")]
    Body(#[source] reqwest::Error),
}

/// The resolution service's answer for one URL
///
/// `expanded` has already been routed through the cleaning rules by the time
/// a caller sees this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedUrl {
    /// The URL that was submitted for resolution
    pub original: String,

    /// Final destination after the service followed all redirects
    pub expanded: String,

    /// Every intermediate URL the service passed through, in order
    #[serde(default)]
    pub redirect_chain: Vec<String>,

    /// Number of redirects followed
    #[serde(default)]
    pub redirect_count: usize,

    /// Page title of the destination, when the service could fetch one
    #[serde(default)]
    pub title: String,

    /// Service-side timestamp of the resolution
    #[serde(default)]
    pub timestamp: String,
}

/// The settled result of one URL's resolution attempt within a batch
///
/// Exactly one of `result`/`error` is populated.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    /// The URL as it appeared in the batch input
    pub original: String,

    /// The resolved destination, on success
    pub result: Option<ResolvedUrl>,

    /// The failure message, on error
    pub error: Option<String>,
}

impl ResolutionOutcome {
    fn success(original: String, result: ResolvedUrl) -> Self {
        Self {
            original,
            result: Some(result),
            error: None,
        }
    }

    fn failure(original: String, error: String) -> Self {
        Self {
            original,
            result: None,
            error: Some(error),
        }
    }

    /// Whether this URL resolved successfully
    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    /// The text that should replace this URL in a rewritten document:
    /// the expanded destination on success, the original URL on failure so
    /// that failed resolutions are never dropped from the output.
    pub fn replacement(&self) -> &str {
        self.result
            .as_ref()
            .map(|resolved| resolved.expanded.as_str())
            .unwrap_or(&self.original)
    }
}

/// Client for the external redirect-resolution service
///
/// Holds one pooled HTTP client; clones share the pool and are cheap, which
/// is how batch expansion hands the client to its per-URL tasks.
#[derive(Debug, Clone)]
pub struct ResolverClient {
    config: ResolverConfig,
    client: Client,
}

impl ResolverClient {
    /// Creates a new client for the given configuration
    pub fn new(config: ResolverConfig) -> Result<Self> {
        debug!(
            "Initializing resolver client for endpoint {} (timeout {:?}, max concurrent {})",
            config.endpoint, config.request_timeout, config.max_concurrent
        );

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .context("Failed to create User-Agent header")?,
        );

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connection_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { config, client })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn request_url(&self, url: &str) -> String {
        let encoded = urlencoding::encode(url);
        let separator = if self.config.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}url={}", self.config.endpoint, separator, encoded)
    }

    /// Resolves one URL to its final destination via the remote service.
    ///
    /// The service's `expanded` value is passed through the cleaning rules
    /// before being returned; cleaning fails open, so resolution never fails
    /// merely because cleaning could not improve the URL.
    ///
    /// # Arguments
    /// * `url` - The URL to resolve
    ///
    /// # Returns
    /// * `Result<ResolvedUrl, ResolutionError>` - The resolved destination or
    ///   a typed per-URL error
    #[instrument(level = "debug", skip_all, fields(url = %url))]
    pub async fn resolve(&self, url: &str) -> Result<ResolvedUrl, ResolutionError> {
        let request_url = self.request_url(url);
        debug!("Requesting expansion: {}", request_url);

        let response = self.client.get(&request_url).send().await.map_err(|e| {
            error!("Failed to reach resolution service for {}: {}", url, e);
            ResolutionError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = truncate_for_log(&response.text().await.unwrap_or_default(), ERROR_BODY_LIMIT);
            warn!("Resolution of {} failed with HTTP {}: {}", url, status, message);
            return Err(ResolutionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let mut resolved: ResolvedUrl = response.json().await.map_err(|e| {
            error!("Resolution service returned an undecodable body for {}: {}", url, e);
            ResolutionError::Body(e)
        })?;

        let cleaned = clean_url(&resolved.expanded);
        if cleaned != resolved.expanded {
            debug!("Cleaned expanded URL {} -> {}", resolved.expanded, cleaned);
            resolved.expanded = cleaned;
        }

        info!(
            "Resolved {} -> {} ({} redirect(s))",
            url, resolved.expanded, resolved.redirect_count
        );
        Ok(resolved)
    }
}
