//! domain_insight library: scored domain reports for web agencies
//!
//! This library aggregates DNS, WHOIS, SSL, blacklist, security-header, SEO,
//! technology, business and performance signals about a domain into one
//! scored report with prioritized recommendations, compares competitors head
//! to head, and runs persisted bulk scans over domain lists.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use domain_insight::{init_cache, Config, LiveCollectors, ScanOrchestrator};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let collectors = Arc::new(LiveCollectors::new(&config)?);
//! let orchestrator = ScanOrchestrator::new(collectors, init_cache(&config)?);
//!
//! let result = orchestrator.scan("example.com").await;
//! println!("{}: {} ({})", result.domain, result.overall_score.score, result.overall_score.grade);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod bulk;
pub mod cache;
pub mod collectors;
pub mod compare;
pub mod config;
pub mod domain;
pub mod error_handling;
pub mod export;
pub mod initialization;
mod parse;
pub mod recommend;
pub mod scan;
pub mod scoring;
pub mod storage;
mod utils;

// Re-export public API
pub use bulk::{BulkJobResults, BulkScanManager, CompletionNotifier, LogNotifier};
pub use cache::{CacheBackend, FileCache, MemoryCache, NoCache};
pub use collectors::{LiveCollectors, SourceCollectors};
pub use compare::{CompetitiveAnalyzer, ComparisonReport};
pub use config::{CacheKind, Config, LogFormat, LogLevel, ScanType};
pub use domain::{clean_domain, clean_domain_list};
pub use error_handling::{CollectorError, DatabaseError, ScanError};
pub use initialization::init_cache;
pub use recommend::{recommend, Recommendation, Recommendations};
pub use scan::{ScanOrchestrator, ScanResult, Section};
pub use scoring::{score, Grade, OverallScore};
pub use storage::{init_db_pool_with_path, run_migrations, BulkJob, BulkOptions, BulkTask};
