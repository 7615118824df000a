use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

// A URL token starts at http:// or https:// (any case) and runs until
// whitespace, a control character, or a character that cannot legally appear
// in a URL. No further validation happens here: the cleaner and resolver deal
// with whatever the scan produces.
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s\x00-\x1f<>"{}|\\^`\[\]]+"#).unwrap()
});

/// One URL occurrence inside a specific text.
///
/// `start`/`end` are byte offsets into the exact text that was scanned, so
/// `text[start..end] == url` always holds. Matches are non-overlapping and
/// sorted by `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMatch {
    /// The matched URL text
    pub url: String,

    /// Byte offset of the first character of the match
    pub start: usize,

    /// Byte offset one past the last character of the match
    pub end: usize,
}

/// Extracts every URL occurrence from `text` with its exact span.
///
/// Pure function of the input: scanning the same text twice yields the same
/// sequence. Text without an `http://`/`https://` prefix produces an empty
/// vector, which is a valid result rather than an error.
pub fn extract_urls(text: &str) -> Vec<UrlMatch> {
    let matches: Vec<UrlMatch> = URL_REGEX
        .find_iter(text)
        .map(|m| UrlMatch {
            url: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect();

    trace!("Extracted {} URL match(es) from {} bytes of text", matches.len(), text.len());
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_spans_with_offsets() {
        let text = "see http://a.co/1 and http://bb.co/22 now";
        let matches = extract_urls(text);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].url, "http://a.co/1");
        assert_eq!(matches[0].start, 4);
        assert_eq!(matches[0].end, 18);
        assert_eq!(matches[1].url, "http://bb.co/22");
        assert_eq!(matches[1].start, 23);
        assert_eq!(matches[1].end, 39);
    }

    #[test]
    fn test_no_urls_yields_empty() {
        assert!(extract_urls("no links here").is_empty());
        assert!(extract_urls("").is_empty());
        assert!(extract_urls("ftp://not.matched/file").is_empty());
    }

    #[test]
    fn test_url_at_end_of_text() {
        let text = "trailing https://example.com/path?q=1";
        let matches = extract_urls(text);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].url, "https://example.com/path?q=1");
        assert_eq!(matches[0].end, text.len());
    }

    #[test]
    fn test_adjacent_urls_are_separate_matches() {
        let text = "<https://a.example/1>\nhttps://b.example/2";
        let matches = extract_urls(text);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].url, "https://a.example/1");
        assert_eq!(matches[1].url, "https://b.example/2");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let matches = extract_urls("go HTTPS://Example.COM/Page here");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].url, "HTTPS://Example.COM/Page");
    }

    #[test]
    fn test_delimiters_terminate_match() {
        let matches = extract_urls(r#"a https://e.com/x"quoted b https://e.com/y|piped"#);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].url, "https://e.com/x");
        assert_eq!(matches[1].url, "https://e.com/y");
    }

    #[test]
    fn test_malformed_url_still_matches() {
        // Anything after the scheme that stays inside the character class
        // counts, even if it would fail strict URL parsing.
        let matches = extract_urls("bad http://:::/// end");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].url, "http://:::///");
    }

    #[test]
    fn test_span_properties_hold() {
        let text = "x http://a.co y http://a.co z https://b.co/q?w=1.";
        let matches = extract_urls(text);

        let mut prev_end = 0;
        for m in &matches {
            assert!(m.start >= prev_end, "matches must be sorted and non-overlapping");
            assert_eq!(&text[m.start..m.end], m.url);
            assert_eq!(m.end - m.start, m.url.len());
            prev_end = m.end;
        }
    }
}
