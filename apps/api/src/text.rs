//! Text normalisation applied to every value before it is interpolated into a prompt.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Word characters, whitespace, and `. , ; : - ( )` survive; everything else is dropped.
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.,;:\-()]").unwrap());

/// Strips non-standard characters and collapses whitespace runs to single spaces.
///
/// Total and deterministic: any input yields a (possibly empty) cleaned string.
pub fn clean_text(text: &str) -> String {
    let stripped = DISALLOWED.replace_all(text, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Collapses whitespace runs and trims, keeping case. Used for cache keys, never for
/// prompt content.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Python\n\n\tdeveloper   "), "Python developer");
    }

    #[test]
    fn test_clean_text_keeps_allowed_punctuation() {
        let input = "Skills: Rust, Go; (5 years) - senior.";
        assert_eq!(clean_text(input), input);
    }

    #[test]
    fn test_clean_text_drops_symbols() {
        assert_eq!(clean_text("C++ & C# @ ACME!"), "C C ACME");
    }

    #[test]
    fn test_clean_text_keeps_unicode_letters() {
        assert_eq!(clean_text("José Müller — Zürich"), "José Müller Zürich");
    }

    #[test]
    fn test_clean_text_is_total() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("★★★"), "");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let once = clean_text("Lead   engineer @ big-co (2019–2023)!");
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn test_normalize_text_keeps_case() {
        assert_eq!(normalize_text("  Senior\tRust  Engineer "), "Senior Rust Engineer");
        assert_ne!(normalize_text("IT"), normalize_text("it"));
    }
}
