//! Page performance metrics.
//!
//! Timing comes from the page fetch itself; resource counts from the DOM.
//! The score starts at 100 and loses points per band below.

use std::sync::LazyLock;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use super::page::FetchedPage;
use crate::config::HEADER_CACHE_CONTROL;
use crate::utils::parse_selector_unsafe;

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("script[src]", "SCRIPT_SELECTOR"));
static STYLESHEET_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"link[rel="stylesheet"]"#, "STYLESHEET_SELECTOR")
});
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("img", "IMG_SELECTOR"));

/// (threshold, penalty, issue) bands, most severe first. Only the first
/// matching band of each table applies.
const TTFB_BANDS_MS: &[(u64, u32, &str)] = &[
    (1800, 25, "Very slow server response (TTFB over 1.8s)"),
    (800, 10, "Slow server response (TTFB over 800ms)"),
];
const LOAD_TIME_BANDS_MS: &[(u64, u32, &str)] = &[
    (5000, 25, "Very slow page load (over 5s)"),
    (3000, 15, "Slow page load (over 3s)"),
    (1500, 5, "Page load could be faster (over 1.5s)"),
];
const PAGE_SIZE_BANDS_BYTES: &[(u64, u32, &str)] = &[
    (5 * 1024 * 1024, 20, "Very large page (over 5MB)"),
    (2 * 1024 * 1024, 10, "Large page (over 2MB)"),
    (1024 * 1024, 5, "Page size over 1MB"),
];

pub const MAX_SCRIPTS: usize = 20;
pub const MAX_STYLESHEETS: usize = 10;
pub const MAX_IMAGES: usize = 50;

pub const ISSUE_TOO_MANY_SCRIPTS: &str = "Too many external scripts";
pub const ISSUE_TOO_MANY_STYLESHEETS: &str = "Too many stylesheets";
pub const ISSUE_TOO_MANY_IMAGES: &str = "Too many images on the page";
pub const ISSUE_NO_CACHE_CONTROL: &str = "No Cache-Control header";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// 0-100
    pub score: u32,
    pub ttfb_ms: u64,
    pub load_time_ms: u64,
    pub page_size_bytes: u64,
    pub script_count: usize,
    pub stylesheet_count: usize,
    pub image_count: usize,
    pub has_cache_control: bool,
    pub issues: Vec<String>,
}

fn band_penalty(value: u64, bands: &[(u64, u32, &'static str)]) -> Option<(u32, &'static str)> {
    bands
        .iter()
        .find(|(threshold, _, _)| value > *threshold)
        .map(|(_, penalty, issue)| (*penalty, *issue))
}

/// Measures a fetched page.
pub fn measure_performance(page: &FetchedPage) -> PerformanceReport {
    let document = page.document();

    let mut report = PerformanceReport {
        ttfb_ms: page.ttfb_ms(),
        load_time_ms: page.load_time_ms(),
        page_size_bytes: page.size_bytes,
        script_count: document.select(&SCRIPT_SELECTOR).count(),
        stylesheet_count: document.select(&STYLESHEET_SELECTOR).count(),
        image_count: document.select(&IMG_SELECTOR).count(),
        has_cache_control: page
            .header(HEADER_CACHE_CONTROL)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false),
        ..Default::default()
    };

    let mut penalty = 0u32;
    let mut issues: Vec<String> = Vec::new();

    for (value, bands) in [
        (report.ttfb_ms, TTFB_BANDS_MS),
        (report.load_time_ms, LOAD_TIME_BANDS_MS),
        (report.page_size_bytes, PAGE_SIZE_BANDS_BYTES),
    ] {
        if let Some((points, issue)) = band_penalty(value, bands) {
            penalty += points;
            issues.push(issue.to_string());
        }
    }

    if report.script_count > MAX_SCRIPTS {
        penalty += 10;
        issues.push(ISSUE_TOO_MANY_SCRIPTS.to_string());
    }
    if report.stylesheet_count > MAX_STYLESHEETS {
        penalty += 5;
        issues.push(ISSUE_TOO_MANY_STYLESHEETS.to_string());
    }
    if report.image_count > MAX_IMAGES {
        penalty += 5;
        issues.push(ISSUE_TOO_MANY_IMAGES.to_string());
    }
    if !report.has_cache_control {
        penalty += 10;
        issues.push(ISSUE_NO_CACHE_CONTROL.to_string());
    }

    report.score = 100u32.saturating_sub(penalty);
    report.issues = issues;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timed_page(ttfb_ms: u64, load_ms: u64, headers: &[(&str, &str)], body: &str) -> FetchedPage {
        let mut page = FetchedPage::from_parts("https://example.com", headers, body);
        page.ttfb = Duration::from_millis(ttfb_ms);
        page.load_time = Duration::from_millis(load_ms);
        page
    }

    #[test]
    fn test_fast_small_page_scores_100() {
        let page = timed_page(
            120,
            400,
            &[("Cache-Control", "max-age=600")],
            r#"<html><head><link rel="stylesheet" href="a.css"><script src="a.js"></script></head><body><img src="x.png"></body></html>"#,
        );
        let report = measure_performance(&page);
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
        assert_eq!(report.script_count, 1);
        assert_eq!(report.stylesheet_count, 1);
        assert_eq!(report.image_count, 1);
        assert_eq!(report.ttfb_ms, 120);
    }

    #[test]
    fn test_slow_page_bands() {
        let report = measure_performance(&timed_page(2000, 6000, &[], "<html></html>"));
        // 25 (ttfb) + 25 (load) + 10 (cache-control)
        assert_eq!(report.score, 40);
        assert_eq!(report.issues.len(), 3);
        assert!(report.issues.contains(&ISSUE_NO_CACHE_CONTROL.to_string()));
    }

    #[test]
    fn test_band_boundaries_are_exclusive() {
        let report = measure_performance(&timed_page(
            800,
            1500,
            &[("cache-control", "no-cache")],
            "",
        ));
        assert_eq!(report.score, 100);

        let report = measure_performance(&timed_page(
            801,
            1501,
            &[("cache-control", "no-cache")],
            "",
        ));
        assert_eq!(report.score, 85);
    }

    #[test]
    fn test_resource_counts() {
        let scripts = "<script src=\"s.js\"></script>".repeat(MAX_SCRIPTS + 1);
        let report = measure_performance(&timed_page(
            0,
            0,
            &[("cache-control", "public")],
            &format!("<html><head>{}</head></html>", scripts),
        ));
        assert_eq!(report.script_count, MAX_SCRIPTS + 1);
        assert_eq!(report.issues, vec![ISSUE_TOO_MANY_SCRIPTS.to_string()]);
        assert_eq!(report.score, 90);
    }
}
