// Shared test helpers: scripted collectors and database setup.
//
// Each integration test file includes this with `mod helpers;`, so not every
// helper is used by every file.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use domain_insight::collectors::{
    BlacklistReport, BusinessReport, DnsReport, MxRecord, PerformanceReport,
    SecurityHeadersReport, SeoReport, SocialProfile, SslReport, TechnologiesReport, Technology,
    WhoisReport,
};
use domain_insight::{run_migrations, CollectorError, MemoryCache, ScanOrchestrator, SourceCollectors};

/// Scripted answers for one domain.
#[derive(Clone)]
pub struct FakeSite {
    pub dns: Result<DnsReport, CollectorError>,
    pub whois: Result<WhoisReport, CollectorError>,
    pub ssl: Result<SslReport, CollectorError>,
    pub blacklist: Result<BlacklistReport, CollectorError>,
    pub security_headers: Result<SecurityHeadersReport, CollectorError>,
    pub seo: Result<SeoReport, CollectorError>,
    pub technologies: Result<TechnologiesReport, CollectorError>,
    pub business: Result<BusinessReport, CollectorError>,
    pub performance: Result<PerformanceReport, CollectorError>,
}

pub fn technology(name: &str, category: &str) -> Technology {
    Technology {
        name: name.to_string(),
        category: category.to_string(),
        confidence: 100,
        version: None,
    }
}

pub fn technologies(list: Vec<Technology>) -> TechnologiesReport {
    TechnologiesReport {
        count: list.len(),
        technologies: list,
    }
}

impl FakeSite {
    /// Scores 90.6 (A+) with no recommendations: SEO 92, security headers 85,
    /// performance 78, 20 technologies, valid SSL, full business data.
    pub fn healthy() -> Self {
        let mut stack = vec![
            technology("Cloudflare", "CDN"),
            technology("Google Analytics", "Analytics"),
        ];
        for i in 0..18 {
            stack.push(technology(&format!("Library {}", i), "JavaScript libraries"));
        }

        FakeSite {
            dns: Ok(DnsReport {
                a_records: vec!["192.0.2.10".to_string()],
                mx_records: vec![MxRecord {
                    priority: 10,
                    exchange: "mail.example.net".to_string(),
                }],
                spf_record: Some("v=spf1 -all".to_string()),
                ..Default::default()
            }),
            whois: Ok(WhoisReport {
                registrar: Some("Example Registrar".to_string()),
                domain_age_days: Some(4000),
                ..Default::default()
            }),
            ssl: Ok(SslReport {
                valid: true,
                issuer: Some("Example CA".to_string()),
                days_until_expiry: Some(60),
                ..Default::default()
            }),
            blacklist: Ok(BlacklistReport {
                blacklisted: false,
                checked: vec!["zen.spamhaus.org".to_string()],
                ..Default::default()
            }),
            security_headers: Ok(SecurityHeadersReport {
                score: 85,
                present: vec![
                    "Content-Security-Policy".to_string(),
                    "Strict-Transport-Security".to_string(),
                    "X-Content-Type-Options".to_string(),
                    "X-Frame-Options".to_string(),
                ],
                https: true,
                ..Default::default()
            }),
            seo: Ok(SeoReport {
                score: 92,
                title: Some("Example - Widgets for everyone".to_string()),
                h1_count: 1,
                has_viewport: true,
                has_structured_data: true,
                ..Default::default()
            }),
            technologies: Ok(technologies(stack)),
            business: Ok(BusinessReport {
                company_name: Some("Example Inc".to_string()),
                emails: vec!["hello@example.com".to_string()],
                social_profiles: vec![SocialProfile {
                    platform: "LinkedIn".to_string(),
                    url: "https://www.linkedin.com/company/example".to_string(),
                    handle: "example".to_string(),
                }],
                ..Default::default()
            }),
            performance: Ok(PerformanceReport {
                score: 78,
                ttfb_ms: 300,
                load_time_ms: 1200,
                page_size_bytes: 500_000,
                has_cache_control: true,
                ..Default::default()
            }),
        }
    }

    /// Every collector fails with a network error.
    pub fn unreachable() -> Self {
        let err = CollectorError::network("HTTP request connect error: connection refused");
        FakeSite {
            dns: Err(CollectorError::no_data("no DNS records")),
            whois: Err(err.clone()),
            ssl: Err(err.clone()),
            blacklist: Err(err.clone()),
            security_headers: Err(err.clone()),
            seo: Err(err.clone()),
            technologies: Err(err.clone()),
            business: Err(err.clone()),
            performance: Err(err),
        }
    }

    pub fn with_seo(mut self, seo: SeoReport) -> Self {
        self.seo = Ok(seo);
        self
    }

    pub fn with_score_seo(mut self, score: u32) -> Self {
        if let Ok(seo) = &mut self.seo {
            seo.score = score;
        }
        self
    }

    pub fn with_ssl(mut self, ssl: Result<SslReport, CollectorError>) -> Self {
        self.ssl = ssl;
        self
    }

    pub fn with_technologies(mut self, list: Vec<Technology>) -> Self {
        self.technologies = Ok(technologies(list));
        self
    }

    pub fn with_performance_score(mut self, score: u32) -> Self {
        if let Ok(performance) = &mut self.performance {
            performance.score = score;
        }
        self
    }

    pub fn with_missing_headers(mut self, missing: &[&str]) -> Self {
        if let Ok(headers) = &mut self.security_headers {
            headers.missing = missing.iter().map(|h| h.to_string()).collect();
        }
        self
    }

    pub fn failing(mut self, category: &str, message: &str) -> Self {
        let err = CollectorError::network(message);
        match category {
            "dns" => self.dns = Err(err),
            "whois" => self.whois = Err(err),
            "ssl" => self.ssl = Err(err),
            "blacklist" => self.blacklist = Err(err),
            "security_headers" => self.security_headers = Err(err),
            "seo" => self.seo = Err(err),
            "technologies" => self.technologies = Err(err),
            "business_intelligence" => self.business = Err(err),
            "performance" => self.performance = Err(err),
            other => panic!("unknown category {}", other),
        }
        self
    }
}

/// `SourceCollectors` answering from scripted sites. Unknown domains are
/// unreachable. Counts every collector call.
#[derive(Default)]
pub struct FakeCollectors {
    sites: Mutex<HashMap<String, FakeSite>>,
    calls: AtomicUsize,
    calls_per_domain: Mutex<BTreeMap<String, usize>>,
    panic_on: Mutex<Option<String>>,
}

impl FakeCollectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(self, domain: &str, site: FakeSite) -> Self {
        self.set_site(domain, site);
        self
    }

    pub fn set_site(&self, domain: &str, site: FakeSite) {
        self.sites.lock().unwrap().insert(domain.to_string(), site);
    }

    /// Collectors for `domain` panic (simulates a crashed scan task).
    pub fn panicking_on(self, domain: &str) -> Self {
        *self.panic_on.lock().unwrap() = Some(domain.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, domain: &str) -> usize {
        self.calls_per_domain
            .lock()
            .unwrap()
            .get(domain)
            .copied()
            .unwrap_or(0)
    }

    fn site(&self, domain_or_url: &str) -> FakeSite {
        let domain = domain_or_url
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_per_domain
            .lock()
            .unwrap()
            .entry(domain.clone())
            .or_insert(0) += 1;
        if self.panic_on.lock().unwrap().as_deref() == Some(domain.as_str()) {
            panic!("collector crashed for {}", domain);
        }
        self.sites
            .lock()
            .unwrap()
            .get(&domain)
            .cloned()
            .unwrap_or_else(FakeSite::unreachable)
    }
}

#[async_trait]
impl SourceCollectors for FakeCollectors {
    async fn dns(&self, domain: &str) -> Result<DnsReport, CollectorError> {
        self.site(domain).dns
    }
    async fn whois(&self, domain: &str) -> Result<WhoisReport, CollectorError> {
        self.site(domain).whois
    }
    async fn ssl(&self, domain: &str) -> Result<SslReport, CollectorError> {
        self.site(domain).ssl
    }
    async fn blacklist(&self, domain: &str) -> Result<BlacklistReport, CollectorError> {
        self.site(domain).blacklist
    }
    async fn security_headers(&self, url: &str) -> Result<SecurityHeadersReport, CollectorError> {
        self.site(url).security_headers
    }
    async fn seo(&self, url: &str) -> Result<SeoReport, CollectorError> {
        self.site(url).seo
    }
    async fn technologies(&self, url: &str) -> Result<TechnologiesReport, CollectorError> {
        self.site(url).technologies
    }
    async fn business_intelligence(&self, url: &str) -> Result<BusinessReport, CollectorError> {
        self.site(url).business
    }
    async fn performance(&self, url: &str) -> Result<PerformanceReport, CollectorError> {
        self.site(url).performance
    }
}

/// Orchestrator over the given fakes with a fresh in-memory cache.
pub fn orchestrator(collectors: Arc<FakeCollectors>) -> ScanOrchestrator {
    ScanOrchestrator::new(collectors, Arc::new(MemoryCache::new()))
}

/// In-memory database with migrations applied.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}
