//! Recommendation rules applied to assembled scans.

mod helpers;

use std::sync::Arc;

use domain_insight::collectors::{SeoReport, SslReport};
use domain_insight::recommend::PERFORMANCE_THRESHOLD;
use domain_insight::{recommend, ScanResult};
use helpers::{orchestrator, technology, FakeCollectors, FakeSite};

async fn scan_site(site: FakeSite) -> ScanResult {
    let fakes = Arc::new(FakeCollectors::new().with_site("acme.io", site));
    orchestrator(fakes).scan("acme.io").await
}

#[tokio::test]
async fn test_invalid_certificate_is_critical() {
    let result = scan_site(FakeSite::healthy().with_ssl(Ok(SslReport {
        valid: false,
        validation_error: Some("certificate expired".to_string()),
        ..Default::default()
    })))
    .await;

    let critical = &result.recommendations.critical;
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].category, "Security");
    assert!(critical[0].issue.contains("certificate expired"));
    assert_eq!(critical[0].impact, "High");
}

#[tokio::test]
async fn test_ssl_collector_failure_is_critical() {
    let result = scan_site(FakeSite::healthy().failing("ssl", "TLS handshake timed out")).await;
    assert_eq!(result.recommendations.critical.len(), 1);
    assert!(result.recommendations.critical[0]
        .issue
        .contains("TLS handshake timed out"));
}

#[tokio::test]
async fn test_seo_issue_priorities() {
    let seo = SeoReport {
        score: 45,
        has_viewport: false,
        has_structured_data: false,
        issues: vec![
            "Missing title tag".to_string(),
            "Missing meta description".to_string(),
            "Missing H1 heading".to_string(),
            "Missing viewport meta tag".to_string(),
            "No structured data (JSON-LD) found".to_string(),
        ],
        ..Default::default()
    };
    let result = scan_site(FakeSite::healthy().with_seo(seo)).await;
    let recs = &result.recommendations;

    let critical: Vec<&str> = recs.critical.iter().map(|r| r.issue.as_str()).collect();
    assert_eq!(critical, vec!["Missing title tag", "Missing H1 heading"]);

    let important: Vec<(&str, &str)> = recs
        .important
        .iter()
        .map(|r| (r.category.as_str(), r.issue.as_str()))
        .collect();
    assert_eq!(
        important,
        vec![
            ("SEO", "Missing meta description"),
            ("Mobile", "Missing viewport meta tag"),
        ]
    );

    let suggested: Vec<(&str, &str)> = recs
        .suggested
        .iter()
        .map(|r| (r.category.as_str(), r.issue.as_str()))
        .collect();
    assert_eq!(suggested, vec![("SEO", "No structured data (JSON-LD) found")]);

    assert_eq!(recs.total_recommendations, 5);
}

#[tokio::test]
async fn test_missing_headers_and_slow_site() {
    let result = scan_site(
        FakeSite::healthy()
            .with_missing_headers(&["Content-Security-Policy", "Referrer-Policy"])
            .with_performance_score(PERFORMANCE_THRESHOLD - 1),
    )
    .await;
    let important = &result.recommendations.important;

    assert_eq!(important.len(), 2);
    assert_eq!(important[0].category, "Security");
    assert!(important[0]
        .issue
        .contains("Content-Security-Policy, Referrer-Policy"));
    assert_eq!(important[1].category, "Performance");
}

#[tokio::test]
async fn test_performance_at_threshold_is_fine() {
    let result = scan_site(FakeSite::healthy().with_performance_score(PERFORMANCE_THRESHOLD)).await;
    assert!(result
        .recommendations
        .iter()
        .all(|r| r.category != "Performance"));
}

#[tokio::test]
async fn test_technology_gaps_are_suggestions() {
    let result = scan_site(
        FakeSite::healthy().with_technologies(vec![technology("WordPress", "CMS")]),
    )
    .await;
    let suggested: Vec<&str> = result
        .recommendations
        .suggested
        .iter()
        .map(|r| r.category.as_str())
        .collect();
    assert_eq!(suggested, vec!["Performance", "Analytics"]);
}

#[tokio::test]
async fn test_failed_page_sections_produce_no_recommendations() {
    let result = scan_site(
        FakeSite::healthy()
            .failing("seo", "HTTP request connect error")
            .failing("technologies", "HTTP request connect error")
            .failing("security_headers", "HTTP request connect error"),
    )
    .await;
    assert_eq!(result.recommendations.total_recommendations, 0);
}

#[tokio::test]
async fn test_recommend_is_pure() {
    let result = scan_site(FakeSite::healthy().with_score_seo(10)).await;
    assert_eq!(recommend(&result), result.recommendations);
}
