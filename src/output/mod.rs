// Output formatting — terminal display helpers.

pub mod terminal;

/// Truncate to at most `max_chars` characters, marking the cut with "...".
///
/// Operates on characters rather than bytes, so multi-byte input (emoji,
/// accented letters) can never split mid-character or panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((offset, _)) => format!("{}...", &text[..offset]),
    }
}
