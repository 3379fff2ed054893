//! Small string and time helpers.

use chrono::{Duration, Utc};

/// Truncate a string for logging, appending how many bytes were dropped.
///
/// Cuts on a char boundary, so Korean page text never splits a code point.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of bytes to keep
///
/// # Returns
///
/// The original string if it fits, otherwise the longest char-aligned
/// prefix of at most `max` bytes with `"…(+N bytes)"` appended.
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

/// Replace every run of whitespace with a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max` characters of `s`.
///
/// Counts `char`s, not bytes, so multi-byte text is cut at the same visual
/// length as ASCII.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Today's date in Korea Standard Time (UTC+9), `YYYY-MM-DD`.
///
/// Used in the notification header. KST has no daylight saving, so a fixed
/// offset is exact.
pub fn kst_today() -> String {
    (Utc::now() + Duration::hours(9)).format("%Y-%m-%d").to_string()
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
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
    fn test_truncate_for_log_multibyte() {
        // Each Hangul syllable is three bytes.
        let s = "신규아티클";
        assert_eq!(truncate_for_log(s, 4), "신…(+12 bytes)");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("신규 아티클", 2), "신규");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_kst_today_shape() {
        let today = kst_today();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[4..5], "-");
    }

    #[test]
    fn test_utc_timestamp_shape() {
        let ts = utc_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), 20);
    }
}
