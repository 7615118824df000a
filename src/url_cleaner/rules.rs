use lazy_static::lazy_static;
use std::collections::HashSet;
use url::Url;

use super::CleaningRule;

lazy_static! {
    // Known click/share/e-commerce tracking identifiers, stripped on any host.
    // Keys are compared case-insensitively.
    static ref TRACKING_PARAMS: HashSet<&'static str> = [
        // Ad-click identifiers
        "gclid", "dclid", "fbclid", "msclkid", "yclid", "ttclid", "twclid",
        // Mail-campaign identifiers
        "mc_cid", "mc_eid",
        // Social share identifiers
        "igshid", "igsh", "si", "ref", "ref_src", "ref_url",
        // E-commerce affiliate identifiers
        "tag", "linkcode",
    ]
    .iter()
    .copied()
    .collect();
}

// The utm_* family is matched by prefix rather than enumeration
const TRACKING_PREFIXES: &[&str] = &["utm_"];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
        || TRACKING_PARAMS.contains(key.as_str())
}

/// Removes every tracking parameter from `url`, keeping all other query
/// pairs in their original relative order. Returns the URL unchanged when
/// nothing was removed, so callers can detect "no change" by comparison.
fn strip_tracking_params(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let kept: Vec<&(String, String)> = pairs.iter().filter(|(k, _)| !is_tracking_param(k)).collect();
    if kept.len() == pairs.len() {
        return url.clone();
    }

    let mut cleaned = url.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in kept {
            serializer.append_pair(key, value);
        }
        let query = serializer.finish();
        cleaned.set_query(Some(&query));
    }

    cleaned
}

fn host_matches(url: &Url, candidates: &[&str]) -> bool {
    url.host_str()
        .map(|host| {
            let host = host.to_ascii_lowercase();
            candidates.iter().any(|candidate| host == *candidate)
        })
        .unwrap_or(false)
}

/// Unwraps redirector URLs of the shape `https://<host><path>?<param>=<target>`
/// by replacing the whole URL with its target.
pub struct RedirectParamRule {
    name: &'static str,
    hosts: &'static [&'static str],
    path: &'static str,
    param: &'static str,
}

impl CleaningRule for RedirectParamRule {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, url: &Url) -> bool {
        host_matches(url, self.hosts) && url.path() == self.path
    }

    fn clean(&self, url: &Url) -> Url {
        for (key, value) in url.query_pairs() {
            if key == self.param {
                // Only unwrap when the target itself parses; otherwise the
                // URL passes through unchanged.
                if let Ok(target) = Url::parse(&value) {
                    return target;
                }
            }
        }
        url.clone()
    }
}

/// Trims Amazon's `/ref=...` path suffix and strips affiliate parameters.
pub struct AmazonProductRule;

impl CleaningRule for AmazonProductRule {
    fn name(&self) -> &str {
        "amazon-product"
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host.to_ascii_lowercase().contains("amazon."))
            .unwrap_or(false)
    }

    fn clean(&self, url: &Url) -> Url {
        let mut cleaned = url.clone();

        let path = cleaned.path().to_string();
        if let Some(index) = path.find("/ref=") {
            if index > 0 {
                cleaned.set_path(&path[..index]);
            }
        }

        strip_tracking_params(&cleaned)
    }
}

/// Strips the global tracking-parameter table on any host.
pub struct TrackingParamRule;

impl CleaningRule for TrackingParamRule {
    fn name(&self) -> &str {
        "tracking-params"
    }

    fn matches(&self, url: &Url) -> bool {
        url.query().is_some()
    }

    fn clean(&self, url: &Url) -> Url {
        strip_tracking_params(url)
    }
}

/// The shipped rule list, in priority order.
///
/// Host-specific rules come first so a redirector or product link is handled
/// as a whole; the global tracking-parameter rule is the fallback for every
/// other URL. First match that produces a change wins.
pub fn default_rules() -> Vec<Box<dyn CleaningRule>> {
    vec![
        Box::new(RedirectParamRule {
            name: "google-redirect",
            hosts: &["google.com", "www.google.com"],
            path: "/url",
            param: "q",
        }),
        Box::new(RedirectParamRule {
            name: "facebook-redirect",
            hosts: &["l.facebook.com", "lm.facebook.com"],
            path: "/l.php",
            param: "u",
        }),
        Box::new(RedirectParamRule {
            name: "youtube-redirect",
            hosts: &["youtube.com", "www.youtube.com"],
            path: "/redirect",
            param: "q",
        }),
        Box::new(AmazonProductRule),
        Box::new(TrackingParamRule),
    ]
}
