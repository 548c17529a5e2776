/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive equality (Unicode aware)
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive substring search.
/// `needle` should already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Hello", 2), "He");
    }

    #[test]
    fn test_truncate_string_multibyte() {
        // Counts characters, not bytes
        assert_eq!(truncate_string("Æþëlwulf", 8), "Æþëlwulf");
        assert_eq!(truncate_string("Æþëlwulf", 6), "Æþë...");
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Jaina", "JAINA"));
        assert!(eq_ignore_case("Ängel", "ängel"));
        assert!(!eq_ignore_case("Jaina", "Jain"));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Death Knight", "knight"));
        assert!(!contains_ignore_case("Mage", "priest"));
    }
}
