pub mod rules;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

/// A named URL transformation tried against every cleaned URL.
///
/// Rules are evaluated in a fixed priority order; the first rule whose
/// `matches` returns true and whose `clean` output differs from the input
/// wins. Rule sets are configuration: the engine only depends on this
/// contract, so new rules can be added without touching the algorithm.
pub trait CleaningRule: Send + Sync {
    /// Stable rule name, used in logs
    fn name(&self) -> &str;

    /// Whether this rule applies to the given URL at all
    fn matches(&self, url: &Url) -> bool;

    /// The rewritten URL; returning an equal URL means "no change"
    fn clean(&self, url: &Url) -> Url;
}

// Process-wide rule configuration, built once and shared read-only across
// arbitrarily many concurrent resolutions.
static DEFAULT_RULES: Lazy<Vec<Box<dyn CleaningRule>>> = Lazy::new(rules::default_rules);

/// A single URL together with its cleaned form
#[derive(Debug, Clone, Serialize)]
pub struct CleanedUrl {
    /// The URL as it was handed in
    pub original: String,

    /// The URL after rule application (equal to `original` when nothing matched)
    pub cleaned: String,
}

/// Cleans one URL string using the process-wide default rule set.
///
/// Fails open: a string that does not parse as a URL is returned unchanged,
/// never an error — cleaning must not block text from being produced. When a
/// rule rewrites the URL its result is returned immediately; otherwise the
/// canonical string form of the parsed URL comes back.
pub fn clean_url(raw: &str) -> String {
    clean_url_with(&DEFAULT_RULES, raw)
}

/// Cleans one URL string against an explicit, ordered rule list.
///
/// # Arguments
/// * `rules` - Rules to try, in priority order
/// * `raw` - The URL string to clean
///
/// # Returns
/// * `String` - The cleaned URL, or `raw` unchanged when it does not parse
pub fn clean_url_with(rules: &[Box<dyn CleaningRule>], raw: &str) -> String {
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Skipping cleaning, '{}' is not a parseable URL: {}", raw, e);
            return raw.to_string();
        }
    };

    for rule in rules {
        if !rule.matches(&parsed) {
            continue;
        }

        trace!("Rule '{}' matches {}", rule.name(), parsed);
        let cleaned = rule.clean(&parsed);

        if cleaned.as_str() != parsed.as_str() {
            debug!("Rule '{}' rewrote {} -> {}", rule.name(), parsed, cleaned);
            return cleaned.into();
        }
    }

    parsed.into()
}

/// Cleans a batch of URLs, pairing each input with its cleaned form.
pub fn clean_urls(urls: &[String]) -> Vec<CleanedUrl> {
    urls.iter()
        .map(|url| CleanedUrl {
            original: url.clone(),
            cleaned: clean_url(url),
        })
        .collect()
}
