//! Configuration types.
//!
//! This module defines the enums and the library `Config` struct used by both
//! the CLI and programmatic callers.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::config::constants::{
    CACHE_DIR, DB_PATH, DB_PATH_ENV, DEFAULT_USER_AGENT, HTTP_TIMEOUT_SECS, MAX_BULK_DOMAINS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// One JSON object per line
    Json,
}

/// Which cache backend memoizes collector results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CacheKind {
    /// Process-local map, lost on exit
    Memory,
    /// JSON files under `cache_dir`, shared between runs
    File,
    /// No caching; every scan hits the network
    None,
}

/// Kind of scan a bulk job applies to each of its domains.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanType {
    /// Every category, scored, with recommendations
    Complete,
    /// DNS records only
    Dns,
    /// WHOIS registration data only
    Whois,
    /// TLS certificate only
    Ssl,
    /// DNSBL listing only
    Blacklist,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use domain_insight::Config;
///
/// let config = Config {
///     timeout_seconds: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file) for bulk jobs and scan history
    pub db_path: PathBuf,

    /// Cache backend for collector results
    pub cache: CacheKind,

    /// Directory used by the file cache
    pub cache_dir: PathBuf,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Largest domain list a bulk job accepts
    pub max_bulk_domains: usize,
}

impl Config {
    /// Database path honoring the `DOMAIN_INSIGHT_DB_PATH` environment variable.
    pub fn default_db_path() -> PathBuf {
        std::env::var(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DB_PATH))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: Self::default_db_path(),
            cache: CacheKind::File,
            cache_dir: PathBuf::from(CACHE_DIR),
            timeout_seconds: HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_bulk_domains: MAX_BULK_DOMAINS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_scan_type_round_trips_through_strings() {
        for (text, scan_type) in [
            ("complete", ScanType::Complete),
            ("dns", ScanType::Dns),
            ("whois", ScanType::Whois),
            ("ssl", ScanType::Ssl),
            ("blacklist", ScanType::Blacklist),
        ] {
            assert_eq!(scan_type.to_string(), text);
            assert_eq!(text.parse::<ScanType>().unwrap(), scan_type);
        }
        assert!("screenshot".parse::<ScanType>().is_err());
    }

    #[test]
    fn test_scan_type_serde_is_lowercase() {
        let json = serde_json::to_string(&ScanType::Blacklist).unwrap();
        assert_eq!(json, "\"blacklist\"");
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.timeout_seconds, 15);
        assert_eq!(config.max_bulk_domains, 100);
        assert_eq!(config.cache, CacheKind::File);
        assert_eq!(config.cache_dir, PathBuf::from(".domain_insight_cache"));
    }
}
