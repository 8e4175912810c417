//! Configuration constants.
//!
//! Timeouts, cache lifetimes, scoring weights and batch limits used throughout
//! the crate.

use std::time::Duration;

pub const DB_PATH: &str = "./domain_insight.db";
/// Environment variable overriding [`DB_PATH`].
pub const DB_PATH_ENV: &str = "DOMAIN_INSIGHT_DB_PATH";
pub const CACHE_DIR: &str = ".domain_insight_cache";

// Network operation timeouts
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection timeout in seconds (TLS inspection)
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;
/// Total time allowed for one WHOIS/RDAP lookup
pub const WHOIS_TIMEOUT_SECS: u64 = 10;
/// Default per-request HTTP timeout in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Port the TLS inspector connects to
pub const HTTPS_PORT: u16 = 443;

/// Default User-Agent string for HTTP requests.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; domain_insight/0.1; +https://github.com/alexwoolford/domain_insight)";

/// Maximum response body size in bytes (2MB).
/// Larger bodies are truncated before parsing.
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

/// How long a fetched home page is shared between the page-based collectors
/// of one scan.
pub const PAGE_CACHE_TTL: Duration = Duration::from_secs(30);

// Retry strategy for page fetches (connect/timeout errors only)
pub const RETRY_INITIAL_DELAY_MS: u64 = 250;
pub const RETRY_FACTOR: u64 = 2;
pub const RETRY_MAX_ATTEMPTS: usize = 2;

// Cache lifetimes per collector category
pub const DNS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const WHOIS_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const SSL_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const BLACKLIST_CACHE_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const SECURITY_HEADERS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const SEO_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const TECHNOLOGIES_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const BUSINESS_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const PERFORMANCE_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

// Scoring weights (sum to 100)
pub const WEIGHT_SEO: f64 = 25.0;
pub const WEIGHT_SECURITY: f64 = 20.0;
pub const WEIGHT_PERFORMANCE: f64 = 20.0;
pub const WEIGHT_TECHNOLOGIES: f64 = 15.0;
pub const WEIGHT_SSL: f64 = 10.0;
pub const WEIGHT_BUSINESS: f64 = 10.0;

/// Technology count that maps to a full technologies sub-score.
pub const TECHNOLOGY_SATURATION_COUNT: f64 = 15.0;

// Bulk scans
/// Maximum number of domains accepted by one bulk job
pub const MAX_BULK_DOMAINS: usize = 100;
/// Number of technologies suggested per domain in a comparison
pub const MAX_OPPORTUNITIES: usize = 5;

/// Maximum domain name length (RFC 1035)
pub const MAX_DOMAIN_LENGTH: usize = 253;

/// Maximum error message length stored on a bulk task
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;
