//! Completion notification seam.
//!
//! Delivery (webhooks, e-mail) lives outside this crate; the runner only calls
//! the notifier once a job with `options.notify` completes.

use async_trait::async_trait;

use crate::storage::BulkJob;

#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    /// Called once, after the job reached `completed`.
    async fn job_completed(&self, job: &BulkJob);
}

/// Logs the completion summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl CompletionNotifier for LogNotifier {
    async fn job_completed(&self, job: &BulkJob) {
        log::info!(
            "Bulk job {} completed: {} of {} domains succeeded, {} failed",
            job.id,
            job.completed,
            job.total_domains,
            job.failed
        );
    }
}
