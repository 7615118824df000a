pub mod logger;

/// Trims and truncates arbitrary text (usually a service response body) so it
/// can be embedded in a log line or error message without flooding it.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }

    let kept: String = trimmed.chars().take(max_chars).collect();
    format!("{}...", kept)
}
