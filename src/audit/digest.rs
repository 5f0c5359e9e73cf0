//! Bounded head/tail digests of command output.

/// Default digest cap in characters.
pub const DEFAULT_DIGEST_CHARS: usize = 200;

/// Separator placed between the head and tail of a digested text.
pub const DIGEST_MARKER: &str = " [...] ";

/// Produce a bounded digest of `text`.
///
/// Text of at most `max_chars` characters is returned verbatim. Longer text
/// keeps its first `max_chars / 2` and last `max_chars / 2` characters,
/// joined by [`DIGEST_MARKER`].
pub fn digest(text: &str, max_chars: usize) -> String {
    let len = text.chars().count();
    if len <= max_chars {
        return text.to_string();
    }

    let half = max_chars / 2;
    let head: String = text.chars().take(half).collect();
    let tail: String = text.chars().skip(len - half).collect();
    format!("{}{}{}", head, DIGEST_MARKER, tail)
}
