//! Complete scan orchestration.
//!
//! Fans out to the nine collectors through the cache, assembles the
//! envelope, then scores it and derives recommendations. A scan never fails:
//! every collector error is stored in its section.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::envelope::{CompetitorBenchmark, ScanResult};
use crate::cache::{cache_key, remember, CacheBackend};
use crate::collectors::SourceCollectors;
use crate::config::{
    ScanType, BLACKLIST_CACHE_TTL, BUSINESS_CACHE_TTL, DNS_CACHE_TTL, PERFORMANCE_CACHE_TTL,
    SECURITY_HEADERS_CACHE_TTL, SEO_CACHE_TTL, SSL_CACHE_TTL, TECHNOLOGIES_CACHE_TTL,
    WHOIS_CACHE_TTL,
};
use crate::domain::{clean_domain, domain_url};
use crate::error_handling::{CollectorError, ScanError};
use crate::recommend::recommend;
use crate::scoring::{score, OverallScore};
use crate::utils::round2;

// Cache key prefixes, one per category
pub const CATEGORY_DNS: &str = "dns";
pub const CATEGORY_WHOIS: &str = "whois";
pub const CATEGORY_SSL: &str = "ssl";
pub const CATEGORY_BLACKLIST: &str = "blacklist";
pub const CATEGORY_SECURITY_HEADERS: &str = "security_headers";
pub const CATEGORY_SEO: &str = "seo";
pub const CATEGORY_TECHNOLOGIES: &str = "technologies";
pub const CATEGORY_BUSINESS: &str = "business_intelligence";
pub const CATEGORY_PERFORMANCE: &str = "performance";

/// Runs scans against a set of collectors and a cache.
#[derive(Clone)]
pub struct ScanOrchestrator {
    collectors: Arc<dyn SourceCollectors>,
    cache: Arc<dyn CacheBackend>,
}

impl ScanOrchestrator {
    pub fn new(collectors: Arc<dyn SourceCollectors>, cache: Arc<dyn CacheBackend>) -> Self {
        Self { collectors, cache }
    }

    async fn cached<T, F, Fut>(
        &self,
        category: &str,
        domain: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, CollectorError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, CollectorError>>,
    {
        let key = cache_key(category, domain);
        let result = remember(self.cache.as_ref(), &key, ttl, producer).await;
        if let Err(e) = &result {
            log::warn!("{} collector failed for {}: {}", category, domain, e);
        }
        result
    }

    /// Complete scan of one domain.
    ///
    /// `domain` is expected to be cleaned already (see [`clean_domain`]); it is
    /// used verbatim for cache keys and lookups.
    pub async fn scan(&self, domain: &str) -> ScanResult {
        let start = Instant::now();
        let url = domain_url(domain);
        let collectors = self.collectors.as_ref();
        log::info!("Starting complete scan of {}", domain);

        let (
            dns,
            whois,
            ssl,
            blacklist,
            security_headers,
            seo,
            technologies,
            business_intelligence,
            performance,
        ) = tokio::join!(
            self.cached(CATEGORY_DNS, domain, DNS_CACHE_TTL, || collectors.dns(domain)),
            self.cached(CATEGORY_WHOIS, domain, WHOIS_CACHE_TTL, || collectors.whois(domain)),
            self.cached(CATEGORY_SSL, domain, SSL_CACHE_TTL, || collectors.ssl(domain)),
            self.cached(CATEGORY_BLACKLIST, domain, BLACKLIST_CACHE_TTL, || {
                collectors.blacklist(domain)
            }),
            self.cached(
                CATEGORY_SECURITY_HEADERS,
                domain,
                SECURITY_HEADERS_CACHE_TTL,
                || collectors.security_headers(&url)
            ),
            self.cached(CATEGORY_SEO, domain, SEO_CACHE_TTL, || collectors.seo(&url)),
            self.cached(CATEGORY_TECHNOLOGIES, domain, TECHNOLOGIES_CACHE_TTL, || {
                collectors.technologies(&url)
            }),
            self.cached(CATEGORY_BUSINESS, domain, BUSINESS_CACHE_TTL, || {
                collectors.business_intelligence(&url)
            }),
            self.cached(CATEGORY_PERFORMANCE, domain, PERFORMANCE_CACHE_TTL, || {
                collectors.performance(&url)
            }),
        );

        let mut result = ScanResult {
            domain: domain.to_string(),
            url: url.clone(),
            scan_date: Utc::now(),
            scan_id: Uuid::new_v4().to_string(),
            dns: dns.into(),
            whois: whois.into(),
            ssl: ssl.into(),
            blacklist: blacklist.into(),
            security_headers: security_headers.into(),
            seo: seo.into(),
            technologies: technologies.into(),
            business_intelligence: business_intelligence.into(),
            performance: performance.into(),
            competitors: Vec::new(),
            recommendations: Default::default(),
            overall_score: OverallScore::from_breakdown(Default::default()),
            execution_time: 0.0,
        };

        result.overall_score = score(&result);
        result.recommendations = recommend(&result);
        result.execution_time = round2(start.elapsed().as_secs_f64());

        let failed = result.failed_categories().len();
        log::info!(
            "Scanned {} in {:.2}s: score {} ({}), {} of 9 categories failed",
            domain,
            result.execution_time,
            result.overall_score.score,
            result.overall_score.grade,
            failed
        );

        result
    }

    /// Scans `domain`, then each competitor, and attaches the competitors'
    /// scores. Invalid or duplicate competitor names are skipped, as is the
    /// domain itself.
    pub async fn scan_with_competitors<S: AsRef<str>>(
        &self,
        domain: &str,
        competitors: &[S],
    ) -> ScanResult {
        let mut result = self.scan(domain).await;

        let mut seen = vec![domain.to_string()];
        for competitor in competitors {
            let Some(competitor) = clean_domain(competitor.as_ref()) else {
                log::warn!("Skipping invalid competitor domain: {}", competitor.as_ref());
                continue;
            };
            if seen.contains(&competitor) {
                continue;
            }
            let scanned = self.scan(&competitor).await;
            result.competitors.push(CompetitorBenchmark {
                domain: competitor.clone(),
                score: scanned.overall_score.score,
                grade: scanned.overall_score.grade,
            });
            seen.push(competitor);
        }

        result
    }

    /// Runs one kind of scan and returns its JSON.
    ///
    /// Single-category scans fail when their collector fails, so a bulk task
    /// can be marked failed. A complete scan always succeeds.
    pub async fn scan_category(
        &self,
        domain: &str,
        scan_type: ScanType,
    ) -> Result<serde_json::Value, ScanError> {
        let collectors = self.collectors.as_ref();
        let value = match scan_type {
            ScanType::Complete => serde_json::to_value(self.scan(domain).await)?,
            ScanType::Dns => serde_json::to_value(
                self.cached(CATEGORY_DNS, domain, DNS_CACHE_TTL, || collectors.dns(domain))
                    .await?,
            )?,
            ScanType::Whois => serde_json::to_value(
                self.cached(CATEGORY_WHOIS, domain, WHOIS_CACHE_TTL, || {
                    collectors.whois(domain)
                })
                .await?,
            )?,
            ScanType::Ssl => serde_json::to_value(
                self.cached(CATEGORY_SSL, domain, SSL_CACHE_TTL, || collectors.ssl(domain))
                    .await?,
            )?,
            ScanType::Blacklist => serde_json::to_value(
                self.cached(CATEGORY_BLACKLIST, domain, BLACKLIST_CACHE_TTL, || {
                    collectors.blacklist(domain)
                })
                .await?,
            )?,
        };
        Ok(value)
    }

    /// Drops every cached category for a domain. Returns the number of
    /// entries removed.
    pub async fn invalidate(&self, domain: &str) -> usize {
        match self.cache.clear(&cache_key("*", domain)).await {
            Ok(removed) => {
                log::debug!("Invalidated {} cache entries for {}", removed, domain);
                removed
            }
            Err(e) => {
                log::warn!("Failed to invalidate cache for {}: {}", domain, e);
                0
            }
        }
    }
}
