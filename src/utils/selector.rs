//! CSS selector and regex compilation for static patterns.

use regex::Regex;
use scraper::Selector;

/// Parses a CSS selector that must succeed (for compile-time constants).
///
/// # Panics
///
/// Panics if the selector cannot be parsed (indicates a programming error).
pub fn parse_selector_unsafe(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}' in {}: {}. This is a programming error.",
            selector_str, context, e
        )
    })
}

/// Compiles a regex pattern that must succeed (for compile-time constants).
///
/// # Panics
///
/// Panics if the pattern is invalid (indicates a programming error).
pub fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_unsafe_valid() {
        let selector = parse_selector_unsafe("meta[name='viewport']", "test");
        let html = scraper::Html::parse_document(
            r#"<html><head><meta name="viewport" content="width=device-width"></head></html>"#,
        );
        assert_eq!(html.select(&selector).count(), 1);
    }

    #[test]
    #[should_panic(expected = "programming error")]
    fn test_parse_selector_unsafe_invalid_panics() {
        parse_selector_unsafe("[[[", "test");
    }

    #[test]
    #[should_panic(expected = "programming error")]
    fn test_compile_regex_unsafe_invalid_panics() {
        compile_regex_unsafe("(unclosed", "test");
    }
}
