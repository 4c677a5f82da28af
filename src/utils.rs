//! Small helpers shared by the sources and renderers.
//!
//! - String truncation for log previews of response bodies
//! - JSON error classification for cut-off downloads
//! - Capitalisation for display headings

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) with an ellipsis and the number of dropped bytes appended.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of bytes to keep
///
/// # Returns
///
/// The original string if it fits in `max` bytes, otherwise the kept prefix
/// with `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Detect if a serde_json error means the body ended early.
///
/// A snapshot that stops mid-object usually means the generator was still
/// writing the file or the transfer was cut; worth calling out in logs since
/// the same file will likely parse on the next run.
///
/// # Arguments
///
/// * `e` - The serde_json error to classify
///
/// # Returns
///
/// `true` if the error is an EOF error, i.e. the body stopped early.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Capitalize the first character of a string.
///
/// Used for category headings ("healthcare" -> "Healthcare").
///
/// # Arguments
///
/// * `s` - The text to capitalize
///
/// # Returns
///
/// `s` with its first character uppercased; an empty string stays empty.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let s = "ééééé";
        let result = truncate_for_log(s, 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("(+8 bytes)"));
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("healthcare"), "Healthcare");
        assert_eq!(upcase("general"), "General");
        assert_eq!(upcase(""), "");
        assert_eq!(upcase("a"), "A");
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"{"weekly_top_story": {"headline": "cut"#;
        let err = serde_json::from_str::<serde_json::Value>(json_eof).unwrap_err();
        assert!(looks_truncated(&err));

        let json_bad = r#"{"stories": nope}"#;
        let err = serde_json::from_str::<serde_json::Value>(json_bad).unwrap_err();
        assert!(!looks_truncated(&err));
    }
}
