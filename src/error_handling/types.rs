//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),

    /// Error creating the cache directory.
    #[error("Cache initialization error: {0}")]
    CacheError(String),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Error applying schema migrations.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored JSON column could not be (de)serialized.
    #[error("Stored JSON error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A row holds a value this version does not understand.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// Error types for cache backends.
///
/// Cache failures are logged and otherwise ignored by `remember`; they never
/// fail a collector.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading or writing a cache file failed.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cached value could not be (de)serialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single source collector.
///
/// Never escapes a complete scan: the orchestrator stores the message in the
/// category's section and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    /// Network-level failure (connect, timeout, TLS, HTTP status).
    #[error("{0}")]
    Network(String),

    /// A lookup returned nothing usable.
    #[error("{0}")]
    NoData(String),

    /// The remote answer could not be parsed.
    #[error("{0}")]
    Parse(String),
}

impl CollectorError {
    pub fn network(msg: impl Into<String>) -> Self {
        CollectorError::Network(msg.into())
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        CollectorError::NoData(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        CollectorError::Parse(msg.into())
    }
}

/// Errors surfaced to callers of the scan, compare and bulk operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bad input: empty or oversized domain list, too few domains to compare.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A job (or other keyed record) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bulk job already ran to completion.
    #[error("Bulk job {0} is already completed")]
    AlreadyCompleted(String),

    /// The bulk job was cancelled and will not be processed.
    #[error("Bulk job {0} was cancelled")]
    JobCancelled(String),

    /// A single-category scan failed.
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Database read or write failed.
    #[error(transparent)]
    Persistence(#[from] DatabaseError),

    /// A result could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for ScanError {
    fn from(e: sqlx::Error) -> Self {
        ScanError::Persistence(DatabaseError::SqlError(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_error_displays_bare_message() {
        let err = CollectorError::network("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(
            CollectorError::no_data("no A records").to_string(),
            "no A records"
        );
    }

    #[test]
    fn test_scan_error_messages() {
        assert_eq!(
            ScanError::Validation("at least 2 domains are required".into()).to_string(),
            "Validation error: at least 2 domains are required"
        );
        assert_eq!(
            ScanError::AlreadyCompleted("abc".into()).to_string(),
            "Bulk job abc is already completed"
        );
        assert_eq!(
            ScanError::NotFound("bulk job abc".into()).to_string(),
            "Not found: bulk job abc"
        );
    }

    #[test]
    fn test_sqlx_error_becomes_persistence() {
        let err: ScanError = sqlx::Error::RowNotFound.into();
        assert!(matches!(
            err,
            ScanError::Persistence(DatabaseError::SqlError(_))
        ));
    }

    #[test]
    fn test_collector_error_converts_into_scan_error() {
        let err: ScanError = CollectorError::parse("bad WHOIS").into();
        assert_eq!(err.to_string(), "Collector error: bad WHOIS");
    }
}
