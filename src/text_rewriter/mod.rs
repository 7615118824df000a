use tracing::trace;

use crate::url_extractor::extract_urls;

/// One (original URL -> replacement URL) pair for text rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlReplacement {
    /// The URL text as it appears in the document
    pub original: String,

    /// The text to substitute for it
    pub replacement: String,
}

/// Rewrites `text`, substituting each matched URL span with its replacement.
///
/// The spans are re-derived from `text` itself rather than taken from the
/// caller: offsets computed against a stale copy of the text would corrupt
/// the output. Substitution runs in descending span-start order, so earlier
/// replacements never shift the offsets of spans still to be processed even
/// when replacement lengths differ from the matched URLs.
///
/// A span whose URL has no entry in `replacements` is left untouched, as is
/// every character outside any span. Duplicate `original` entries resolve to
/// the first one in slice order.
pub fn replace_urls_in_text(text: &str, replacements: &[UrlReplacement]) -> String {
    let matches = extract_urls(text);
    let mut result = text.to_string();

    for url_match in matches.iter().rev() {
        let replacement = replacements
            .iter()
            .find(|candidate| candidate.original == url_match.url);

        if let Some(replacement) = replacement {
            trace!(
                "Replacing span [{}, {}) '{}' with '{}'",
                url_match.start,
                url_match.end,
                url_match.url,
                replacement.replacement
            );
            result.replace_range(url_match.start..url_match.end, &replacement.replacement);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(original: &str, replacement: &str) -> UrlReplacement {
        UrlReplacement {
            original: original.to_string(),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_replacement_lengths_may_differ_in_both_directions() {
        let text = "see http://a.co/1 and http://bb.co/22 now";
        let replacements = vec![
            pair("http://a.co/1", "https://long.example/a"),
            pair("http://bb.co/22", "x"),
        ];

        assert_eq!(
            replace_urls_in_text(text, &replacements),
            "see https://long.example/a and x now"
        );
    }

    #[test]
    fn test_empty_replacements_is_a_noop() {
        let text = "see http://a.co/1 and http://bb.co/22 now";
        assert_eq!(replace_urls_in_text(text, &[]), text);
        assert_eq!(replace_urls_in_text("no links here", &[]), "no links here");
    }

    #[test]
    fn test_identity_replacements_are_a_noop() {
        let text = "a http://a.co/1 b https://bb.co/22 c";
        let replacements: Vec<UrlReplacement> = extract_urls(text)
            .into_iter()
            .map(|url_match| pair(&url_match.url, &url_match.url))
            .collect();

        assert_eq!(replace_urls_in_text(text, &replacements), text);
    }

    #[test]
    fn test_unmatched_spans_are_left_alone() {
        let text = "keep http://keep.me/1 swap http://swap.me/2 end";
        let replacements = vec![pair("http://swap.me/2", "https://final.example/")];

        assert_eq!(
            replace_urls_in_text(text, &replacements),
            "keep http://keep.me/1 swap https://final.example/ end"
        );
    }

    #[test]
    fn test_duplicate_occurrences_all_replaced() {
        let text = "http://a.co/1 then http://a.co/1 again";
        let replacements = vec![pair("http://a.co/1", "https://b.example/")];

        assert_eq!(
            replace_urls_in_text(text, &replacements),
            "https://b.example/ then https://b.example/ again"
        );
    }

    #[test]
    fn test_first_replacement_wins_for_duplicate_originals() {
        let text = "go http://a.co/1 now";
        let replacements = vec![
            pair("http://a.co/1", "https://first.example/"),
            pair("http://a.co/1", "https://second.example/"),
        ];

        assert_eq!(
            replace_urls_in_text(text, &replacements),
            "go https://first.example/ now"
        );
    }

    #[test]
    fn test_surrounding_text_is_byte_exact() {
        let text = "über http://a.co/1 — fin";
        let replacements = vec![pair("http://a.co/1", "https://dest.example/page")];

        assert_eq!(
            replace_urls_in_text(text, &replacements),
            "über https://dest.example/page — fin"
        );
    }
}
