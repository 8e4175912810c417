//! Complete scans.
//!
//! [`ScanOrchestrator`] runs the collectors for one domain and assembles a
//! [`ScanResult`] whose categories are each a [`Section`].

mod envelope;
mod orchestrator;

// Re-export public API
pub use envelope::{CompetitorBenchmark, ScanResult, Section};
pub use orchestrator::{
    ScanOrchestrator, CATEGORY_BLACKLIST, CATEGORY_BUSINESS, CATEGORY_DNS, CATEGORY_PERFORMANCE,
    CATEGORY_SECURITY_HEADERS, CATEGORY_SEO, CATEGORY_SSL, CATEGORY_TECHNOLOGIES, CATEGORY_WHOIS,
};
