//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, cache lifetimes, scoring weights, limits)
//! - HTTP header name constants
//! - Configuration types shared by the CLI and the library

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{CacheKind, Config, LogFormat, LogLevel, ScanType};
