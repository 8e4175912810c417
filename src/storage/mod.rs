// storage/mod.rs
// Database operations module

pub mod jobs;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod scans;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use models::{BulkJob, BulkOptions, BulkTask, JobStatus, ScanSummary, TaskStatus};
pub use pool::init_db_pool_with_path;
pub use scans::{list_scans, load_scan, save_scan};
