//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use crate::error_handling::InitializationError;
use hickory_resolver::TokioAsyncResolver;

/// Initializes the DNS resolver used by the DNS and blacklist collectors.
///
/// Uses the default upstream configuration with short timeouts so a slow
/// nameserver cannot stall a scan. DNSBL zones answer NXDomain for unlisted
/// addresses, so negative answers must fail fast too.
///
/// # Errors
///
/// Kept fallible for callers; hickory 0.24 construction itself does not fail.
pub fn init_resolver() -> Result<Arc<TokioAsyncResolver>, InitializationError> {
    use hickory_resolver::config::{ResolverConfig, ResolverOpts};

    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(crate::config::DNS_TIMEOUT_SECS);
    opts.attempts = 2;
    // Never append search domains; every query here is fully qualified
    opts.ndots = 0;

    Ok(Arc::new(TokioAsyncResolver::tokio(
        ResolverConfig::default(),
        opts,
    )))
}
