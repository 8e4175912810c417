//! Source collectors.
//!
//! One collector per report category:
//! - Domain-based: dns, whois, ssl, blacklist
//! - Page-based (home page URL): security headers, seo, technologies,
//!   business intelligence, performance
//!
//! The orchestrator only sees the [`SourceCollectors`] trait, so tests and
//! alternative backends can substitute their own implementation.

mod blacklist;
mod business;
mod dns;
mod page;
mod performance;
mod security_headers;
mod seo;
mod ssl;
mod technology;
mod whois;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use tokio::sync::{Mutex, OnceCell};

use crate::config::{Config, HTTPS_PORT, PAGE_CACHE_TTL};
use crate::error_handling::{CollectorError, InitializationError};
use crate::initialization::{init_client, init_crypto_provider, init_resolver};

// Re-export public API
pub use blacklist::{check_blacklists, BlacklistReport, DOMAIN_BLOCKLISTS, IP_BLOCKLISTS};
pub use business::{extract_business_info, BusinessReport};
pub use dns::{collect_dns, DnsReport, MxRecord};
pub use page::{fetch_page, FetchedPage};
pub use performance::{measure_performance, PerformanceReport};
pub use security_headers::{analyze_security_headers, SecurityHeadersReport};
pub use seo::{
    analyze_seo, SeoReport, ISSUE_IMAGES_MISSING_ALT, ISSUE_META_DESCRIPTION_TOO_LONG,
    ISSUE_MISSING_CANONICAL, ISSUE_MISSING_H1, ISSUE_MISSING_LANG, ISSUE_MISSING_META_DESCRIPTION,
    ISSUE_MISSING_OPEN_GRAPH, ISSUE_MISSING_TITLE, ISSUE_MISSING_VIEWPORT, ISSUE_MULTIPLE_H1,
    ISSUE_NO_STRUCTURED_DATA, ISSUE_TITLE_TOO_LONG, ISSUE_TITLE_TOO_SHORT,
};
pub use ssl::{inspect_certificate, SslReport};
pub use technology::{
    detect_technologies, TechnologiesReport, Technology, CATEGORY_ANALYTICS, CATEGORY_CDN,
};
pub use whois::{WhoisClient, WhoisReport};

pub use crate::parse::{SocialProfile, StructuredData};

/// The nine data sources behind a complete scan.
///
/// Domain-based collectors receive a cleaned domain; page-based collectors
/// receive the site URL (`https://{domain}`).
#[async_trait]
pub trait SourceCollectors: Send + Sync {
    async fn dns(&self, domain: &str) -> Result<DnsReport, CollectorError>;
    async fn whois(&self, domain: &str) -> Result<WhoisReport, CollectorError>;
    async fn ssl(&self, domain: &str) -> Result<SslReport, CollectorError>;
    async fn blacklist(&self, domain: &str) -> Result<BlacklistReport, CollectorError>;
    async fn security_headers(&self, url: &str) -> Result<SecurityHeadersReport, CollectorError>;
    async fn seo(&self, url: &str) -> Result<SeoReport, CollectorError>;
    async fn technologies(&self, url: &str) -> Result<TechnologiesReport, CollectorError>;
    async fn business_intelligence(&self, url: &str) -> Result<BusinessReport, CollectorError>;
    async fn performance(&self, url: &str) -> Result<PerformanceReport, CollectorError>;
}

/// Collectors backed by the network: reqwest for pages, hickory for DNS and
/// DNSBL, rustls for certificates and whois-service for registration data.
///
/// The five page-based collectors share one fetch of each URL for
/// [`PAGE_CACHE_TTL`]; concurrent callers wait on the same request.
#[derive(Clone)]
pub struct LiveCollectors {
    client: Arc<reqwest::Client>,
    resolver: Arc<TokioAsyncResolver>,
    whois: WhoisClient,
    ssl_port: u16,
    pages: Arc<Mutex<HashMap<String, PageSlot>>>,
}

struct PageSlot {
    created: Instant,
    page: Arc<OnceCell<FetchedPage>>,
}

impl LiveCollectors {
    /// Builds the shared HTTP client and resolver from the config.
    ///
    /// # Errors
    ///
    /// Returns an `InitializationError` if the HTTP client or DNS resolver
    /// cannot be created.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        init_crypto_provider();
        Ok(Self {
            client: init_client(config)?,
            resolver: init_resolver()?,
            whois: WhoisClient::default(),
            ssl_port: HTTPS_PORT,
            pages: Arc::default(),
        })
    }

    /// Uses existing clients (tests point these at local servers).
    pub fn with_parts(
        client: Arc<reqwest::Client>,
        resolver: Arc<TokioAsyncResolver>,
        whois: WhoisClient,
    ) -> Self {
        init_crypto_provider();
        Self {
            client,
            resolver,
            whois,
            ssl_port: HTTPS_PORT,
            pages: Arc::default(),
        }
    }

    /// Fetches `url` once per [`PAGE_CACHE_TTL`]. Failed fetches are not
    /// remembered.
    async fn page(&self, url: &str) -> Result<FetchedPage, CollectorError> {
        let cell = {
            let mut pages = self.pages.lock().await;
            pages.retain(|_, slot| slot.created.elapsed() < PAGE_CACHE_TTL);
            pages
                .entry(url.to_string())
                .or_insert_with(|| PageSlot {
                    created: Instant::now(),
                    page: Arc::new(OnceCell::new()),
                })
                .page
                .clone()
        };
        cell.get_or_try_init(|| fetch_page(&self.client, url))
            .await
            .cloned()
    }
}

#[async_trait]
impl SourceCollectors for LiveCollectors {
    async fn dns(&self, domain: &str) -> Result<DnsReport, CollectorError> {
        collect_dns(&self.resolver, domain).await
    }

    async fn whois(&self, domain: &str) -> Result<WhoisReport, CollectorError> {
        self.whois.lookup(domain).await
    }

    async fn ssl(&self, domain: &str) -> Result<SslReport, CollectorError> {
        inspect_certificate(domain, self.ssl_port).await
    }

    async fn blacklist(&self, domain: &str) -> Result<BlacklistReport, CollectorError> {
        check_blacklists(&self.resolver, domain).await
    }

    async fn security_headers(&self, url: &str) -> Result<SecurityHeadersReport, CollectorError> {
        Ok(analyze_security_headers(&self.page(url).await?))
    }

    async fn seo(&self, url: &str) -> Result<SeoReport, CollectorError> {
        Ok(analyze_seo(&self.page(url).await?))
    }

    async fn technologies(&self, url: &str) -> Result<TechnologiesReport, CollectorError> {
        Ok(detect_technologies(&self.page(url).await?))
    }

    async fn business_intelligence(&self, url: &str) -> Result<BusinessReport, CollectorError> {
        Ok(extract_business_info(&self.page(url).await?))
    }

    async fn performance(&self, url: &str) -> Result<PerformanceReport, CollectorError> {
        Ok(measure_performance(&self.page(url).await?))
    }
}
