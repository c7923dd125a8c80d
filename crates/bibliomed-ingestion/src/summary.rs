//! Summary truncation.

/// Characters kept before the ellipsis.
pub const SUMMARY_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

/// Truncate `text` to its first 300 characters plus `"..."`; shorter text is returned as is.
/// Counts Unicode scalar values, so multi-byte text is never split mid-character.
pub fn summarize(text: &str) -> String {
    match text.char_indices().nth(SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
