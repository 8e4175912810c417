//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - HTTP client
//! - DNS resolver
//! - TLS crypto provider
//! - Cache backend
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

use std::sync::Arc;

use rustls::crypto::{ring::default_provider, CryptoProvider};

use crate::cache::{CacheBackend, FileCache, MemoryCache, NoCache};
use crate::config::{CacheKind, Config};
use crate::error_handling::InitializationError;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes the crypto provider for TLS operations.
///
/// Configures the global crypto provider for `rustls`. This must be called before
/// any TLS connections are established.
pub fn init_crypto_provider() {
    // The return value is ignored because reinstalling the provider is harmless
    let _ = CryptoProvider::install_default(default_provider());
}

/// Builds the cache backend selected in the config.
///
/// # Errors
///
/// Returns `InitializationError::CacheError` if the file cache directory
/// cannot be created.
pub fn init_cache(config: &Config) -> Result<Arc<dyn CacheBackend>, InitializationError> {
    let cache: Arc<dyn CacheBackend> = match config.cache {
        CacheKind::Memory => Arc::new(MemoryCache::new()),
        CacheKind::File => Arc::new(FileCache::new(&config.cache_dir).map_err(|e| {
            InitializationError::CacheError(format!(
                "failed to create cache directory {}: {}",
                config.cache_dir.display(),
                e
            ))
        })?),
        CacheKind::None => Arc::new(NoCache),
    };
    Ok(cache)
}
