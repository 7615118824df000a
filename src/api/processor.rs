use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::api::config::ApiConfig;
use crate::api::models::{CleanTextRequest, CleanTextResponse, UrlReport};
use crate::resolver::ResolverClient;
use crate::text_rewriter::{replace_urls_in_text, UrlReplacement};
use crate::url_extractor::extract_urls;

/// Processes a clean-text request end to end
///
/// This function performs the following steps:
/// 1. Locates every URL occurrence in the submitted text
/// 2. Resolves all of them concurrently through the external service
/// 3. Builds replacement pairs: the expanded destination for resolved URLs,
///    the original text for failed ones
/// 4. Rewrites the text span by span, leaving every other character intact
///
/// Partial failures never abort the request; the response always carries a
/// complete document plus a per-URL report.
///
/// # Arguments
/// * `request` - The clean-text request containing the pasted text
/// * `_config` - API configuration parameters
/// * `resolver` - Shared resolution service client
///
/// # Returns
/// * `Result<CleanTextResponse>` - The rewritten text and per-URL outcomes
#[instrument(skip(request, _config, resolver), fields(text_len = request.text.len()))]
pub async fn process_request(
    request: CleanTextRequest,
    _config: &ApiConfig,
    resolver: Arc<ResolverClient>,
) -> Result<CleanTextResponse> {
    info!("Processing clean-text request ({} bytes)", request.text.len());
    let mut response = CleanTextResponse::new(request.text.clone());

    // Step 1: Locate every URL in the text
    let matches = extract_urls(&request.text);
    response.urls_found = matches.len();

    if matches.is_empty() {
        debug!("No URLs found, returning text unchanged");
        response.status = "success".to_string();
        return Ok(response);
    }
    debug!("Found {} URL occurrence(s) to resolve", matches.len());

    // Step 2: Resolve every occurrence through the external service
    let urls: Vec<String> = matches.iter().map(|url_match| url_match.url.clone()).collect();
    let outcomes = resolver.expand_urls(&urls).await;

    // Step 3: Build replacement pairs. Failed resolutions map a URL onto
    // itself so the document always comes back complete.
    let replacements: Vec<UrlReplacement> = outcomes
        .iter()
        .map(|outcome| UrlReplacement {
            original: outcome.original.clone(),
            replacement: outcome.replacement().to_string(),
        })
        .collect();

    // Step 4: Rewrite the text
    response.cleaned_text = replace_urls_in_text(&request.text, &replacements);

    response.urls_resolved = outcomes.iter().filter(|outcome| outcome.is_resolved()).count();
    response.urls = outcomes.iter().map(UrlReport::from).collect();

    if response.urls_resolved < response.urls_found {
        let failed = response.urls_found - response.urls_resolved;
        warn!(
            "{}/{} URL(s) failed to resolve and were left unchanged",
            failed, response.urls_found
        );
        response.message = Some(format!(
            "{} of {} URLs could not be resolved and were left unchanged",
            failed, response.urls_found
        ));
    }

    response.status = "success".to_string();
    info!(
        "Clean-text request complete: {}/{} URL(s) resolved",
        response.urls_resolved, response.urls_found
    );
    Ok(response)
}
