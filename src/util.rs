/// Parse "true"/"false"/"1"/"0" from a &str.
pub fn parse_bool_str(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "ja" => Some(true),
        "false" | "0" | "no" | "off" | "nej" => Some(false),
        _ => None,
    }
}

/// Normalise an onboarding answer to the "ja"/"nej" wire vocabulary.
pub fn normalize_ja_nej(s: &str) -> Option<&'static str> {
    parse_bool_str(s).map(|value| if value { "ja" } else { "nej" })
}

/// Character count, used wherever length thresholds are applied to display text.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_helpers() {
        assert_eq!(parse_bool_str("true"), Some(true));
        assert_eq!(parse_bool_str("0"), Some(false));
        assert_eq!(parse_bool_str("YES"), Some(true));
        assert_eq!(parse_bool_str("off"), Some(false));
        assert_eq!(parse_bool_str("maybe"), None);
    }

    #[test]
    fn test_normalize_ja_nej_accepts_swedish_and_english() {
        assert_eq!(normalize_ja_nej("Ja"), Some("ja"));
        assert_eq!(normalize_ja_nej(" nej "), Some("nej"));
        assert_eq!(normalize_ja_nej("true"), Some("ja"));
        assert_eq!(normalize_ja_nej("0"), Some("nej"));
        assert_eq!(normalize_ja_nej("kanske"), None);
    }

    #[test]
    fn test_char_len_counts_scalar_values() {
        assert_eq!(char_len("åäö"), 3);
        assert_eq!(char_len(""), 0);
    }
}
