//! Security header analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::page::FetchedPage;
use crate::config::SECURITY_HEADERS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityHeadersReport {
    /// Sum of the weights of the headers present (0-100)
    pub score: u32,
    /// Canonical names of the headers present
    pub present: Vec<String>,
    /// Canonical names of the headers missing
    pub missing: Vec<String>,
    /// Values of the present headers, keyed by canonical name
    pub headers: BTreeMap<String, String>,
    /// Whether the final URL was served over HTTPS
    pub https: bool,
}

/// Scores a page's response headers.
///
/// An empty header value counts as missing.
pub fn analyze_security_headers(page: &FetchedPage) -> SecurityHeadersReport {
    let mut report = SecurityHeadersReport {
        https: page.final_url.starts_with("https://"),
        ..Default::default()
    };

    for (name, weight) in SECURITY_HEADERS {
        match page.header(name).map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => {
                report.score += weight;
                report.present.push(name.to_string());
                report.headers.insert(name.to_string(), value.to_string());
            }
            None => report.missing.push(name.to_string()),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_headers_present_scores_100() {
        let page = FetchedPage::from_parts(
            "https://example.com",
            &[
                ("content-security-policy", "default-src 'self'"),
                ("strict-transport-security", "max-age=63072000"),
                ("x-content-type-options", "nosniff"),
                ("x-frame-options", "DENY"),
                ("referrer-policy", "no-referrer"),
                ("permissions-policy", "camera=()"),
                ("x-xss-protection", "0"),
            ],
            "",
        );
        let report = analyze_security_headers(&page);
        assert_eq!(report.score, 100);
        assert!(report.missing.is_empty());
        assert_eq!(report.present.len(), 7);
        assert!(report.https);
    }

    #[test]
    fn test_no_headers_scores_zero() {
        let page = FetchedPage::from_parts("http://example.com", &[], "");
        let report = analyze_security_headers(&page);
        assert_eq!(report.score, 0);
        assert_eq!(report.missing.len(), 7);
        assert!(!report.https);
    }

    #[test]
    fn test_partial_headers() {
        let page = FetchedPage::from_parts(
            "https://example.com",
            &[
                ("Strict-Transport-Security", "max-age=31536000"),
                ("X-Frame-Options", "SAMEORIGIN"),
                ("Referrer-Policy", "  "),
            ],
            "",
        );
        let report = analyze_security_headers(&page);
        assert_eq!(report.score, 40);
        assert_eq!(
            report.present,
            vec!["Strict-Transport-Security", "X-Frame-Options"]
        );
        assert!(report.missing.contains(&"Referrer-Policy".to_string()));
        assert_eq!(
            report.headers.get("X-Frame-Options").map(String::as_str),
            Some("SAMEORIGIN")
        );
    }
}
