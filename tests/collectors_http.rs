//! Page-based collectors against a local mock HTTP server.

use domain_insight::{CollectorError, Config, LiveCollectors, SourceCollectors};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Acme Widgets - Industrial parts</title>
    <meta name="description" content="Industrial widgets shipped worldwide since 1999.">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="canonical" href="https://acme.io/">
    <meta property="og:site_name" content="Acme">
    <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Organization", "name": "Acme Inc"}</script>
    <script src="/wp-content/themes/acme/jquery-3.6.0.min.js"></script>
</head>
<body>
    <h1>Widgets for every job</h1>
    <img src="/hero.png" alt="A widget">
    <a href="mailto:Sales@Acme.io">Email sales</a>
    <a href="/contact">Contact us</a>
    <a href="https://www.linkedin.com/company/acme">LinkedIn</a>
</body>
</html>"#;

async fn serve_home_page() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "cloudflare")
                .insert_header("strict-transport-security", "max-age=63072000")
                .insert_header("x-frame-options", "DENY")
                .insert_header("cache-control", "public, max-age=600")
                .set_body_raw(HOME_PAGE, "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    server
}

fn collectors() -> LiveCollectors {
    LiveCollectors::new(&Config::default()).expect("collectors should build offline")
}

fn home_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

#[tokio::test]
async fn test_seo_of_well_formed_page() {
    let server = serve_home_page().await;
    let seo = collectors().seo(&home_url(&server)).await.unwrap();

    assert_eq!(seo.title.as_deref(), Some("Acme Widgets - Industrial parts"));
    assert_eq!(seo.h1_count, 1);
    assert!(seo.has_viewport);
    assert!(seo.has_structured_data);
    assert_eq!(seo.lang.as_deref(), Some("en"));
    assert!(seo.issues.is_empty(), "unexpected issues: {:?}", seo.issues);
    assert_eq!(seo.score, 100);
}

#[tokio::test]
async fn test_security_headers_over_plain_http() {
    let server = serve_home_page().await;
    let report = collectors()
        .security_headers(&home_url(&server))
        .await
        .unwrap();

    assert_eq!(
        report.present,
        vec!["Strict-Transport-Security", "X-Frame-Options"]
    );
    assert_eq!(report.score, 40);
    assert!(report.missing.contains(&"Content-Security-Policy".to_string()));
    assert!(!report.https);
}

#[tokio::test]
async fn test_technologies_from_headers_and_markup() {
    let server = serve_home_page().await;
    let report = collectors().technologies(&home_url(&server)).await.unwrap();

    let cloudflare = report.get("Cloudflare").expect("Cloudflare detected");
    assert_eq!(cloudflare.confidence, 100);
    assert!(report.get("WordPress").is_some());
    assert_eq!(
        report.get("jQuery").and_then(|t| t.version.as_deref()),
        Some("3.6.0")
    );
    assert_eq!(report.count, report.technologies.len());
}

#[tokio::test]
async fn test_business_intelligence_from_home_page() {
    let server = serve_home_page().await;
    let url = home_url(&server);
    let report = collectors().business_intelligence(&url).await.unwrap();

    assert_eq!(report.company_name.as_deref(), Some("Acme Inc"));
    assert_eq!(report.emails, vec!["sales@acme.io"]);
    assert_eq!(report.social_profiles.len(), 1);
    assert_eq!(report.contact_page, Some(format!("{}contact", url)));
}

#[tokio::test]
async fn test_performance_of_small_cached_page() {
    let server = serve_home_page().await;
    let report = collectors().performance(&home_url(&server)).await.unwrap();

    assert!(report.has_cache_control);
    assert_eq!(report.script_count, 1);
    assert_eq!(report.image_count, 1);
    assert_eq!(report.page_size_bytes, HOME_PAGE.len() as u64);
    assert!(report.load_time_ms >= report.ttfb_ms);
}

#[tokio::test]
async fn test_error_statuses_are_network_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let collectors = collectors();
    let err = collectors
        .seo(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err, CollectorError::Network("Not Found (404)".to_string()));

    // Status errors are not retried
    let err = collectors
        .performance(&format!("{}/broken", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CollectorError::Network("Internal Server Error (500)".to_string())
    );
}

#[tokio::test]
async fn test_page_collectors_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(HOME_PAGE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let collectors = collectors();
    let url = home_url(&server);
    let (headers, seo, technologies, business, performance) = tokio::join!(
        collectors.security_headers(&url),
        collectors.seo(&url),
        collectors.technologies(&url),
        collectors.business_intelligence(&url),
        collectors.performance(&url),
    );
    assert!(headers.is_ok());
    assert_eq!(seo.unwrap().h1_count, 1);
    assert!(technologies.unwrap().get("WordPress").is_some());
    assert_eq!(business.unwrap().company_name.as_deref(), Some("Acme Inc"));
    assert_eq!(performance.unwrap().page_size_bytes, HOME_PAGE.len() as u64);

    // Clones share the fetched page too
    let again = collectors.clone().seo(&url).await.unwrap();
    assert_eq!(again.h1_count, 1);
}

#[tokio::test]
async fn test_failed_fetch_is_retried_by_next_collector() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(HOME_PAGE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let collectors = collectors();
    let url = format!("{}/flaky", server.uri());
    assert!(collectors.seo(&url).await.is_err());
    assert_eq!(collectors.seo(&url).await.unwrap().h1_count, 1);
    assert!(collectors.performance(&url).await.is_ok());
}
