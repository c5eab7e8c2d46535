// src/utils.rs
use std::borrow::Cow;

/// Cut `text` to its first `keep` characters plus "..." when it is longer than `limit` characters
pub fn truncate_text(text: &str, limit: usize, keep: usize) -> Cow<'_, str> {
    if text.chars().count() <= limit {
        return Cow::Borrowed(text);
    }
    let cut: String = text.chars().take(keep).collect();
    Cow::Owned(format!("{}...", cut))
}

/// Split a comma-separated flag value, dropping empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 100, 100), "short");

        let long = "x".repeat(101);
        let cut = truncate_text(&long, 100, 97);
        assert_eq!(cut.len(), 100);
        assert!(cut.ends_with("..."));

        assert_eq!(truncate_text(&long, 100, 100).chars().count(), 103);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let accented = "é".repeat(5);
        assert_eq!(truncate_text(&accented, 3, 2), "éé...");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list(" , ").is_empty());
    }
}
