//! Error handling.
//!
//! This module provides:
//! - Error type definitions (scan, collector, database, initialization)
//! - Retry strategy configuration
//! - Categorization of HTTP transport errors into collector errors
//!
//! Collector errors never abort a scan: they are captured in the failing
//! category of the result envelope. Everything else surfaces to the caller
//! as a [`ScanError`].

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, get_retry_strategy, is_retriable};
pub use types::{CacheError, CollectorError, DatabaseError, InitializationError, ScanError};
