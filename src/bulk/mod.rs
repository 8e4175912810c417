//! Bulk scan runner.
//!
//! A bulk job is a persisted list of domains sharing one scan type. Jobs are
//! created `pending`, then processed one task at a time; progress survives a
//! restart because every task transition is written before the next begins.

mod notifier;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::{ScanType, MAX_BULK_DOMAINS};
use crate::domain::clean_domain_list;
use crate::error_handling::ScanError;
use crate::scan::ScanOrchestrator;
use crate::storage::jobs;
use crate::storage::{BulkJob, BulkOptions, BulkTask, JobStatus};
use crate::utils::sanitize::sanitize_and_truncate_error_message;

pub use notifier::{CompletionNotifier, LogNotifier};

/// A job together with all of its tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkJobResults {
    pub job: BulkJob,
    pub tasks: Vec<BulkTask>,
}

/// Creates, processes and reports on bulk jobs.
#[derive(Clone)]
pub struct BulkScanManager {
    pool: Arc<SqlitePool>,
    orchestrator: Arc<ScanOrchestrator>,
    notifier: Arc<dyn CompletionNotifier>,
    max_batch_size: usize,
}

impl BulkScanManager {
    pub fn new(pool: Arc<SqlitePool>, orchestrator: Arc<ScanOrchestrator>) -> Self {
        Self {
            pool,
            orchestrator,
            notifier: Arc::new(LogNotifier),
            max_batch_size: MAX_BULK_DOMAINS,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn CompletionNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Creates a pending job with one task per valid, distinct domain.
    ///
    /// # Errors
    ///
    /// `ScanError::Validation` if the list is empty, longer than the max batch
    /// size, or holds no valid domain.
    pub async fn create_job<S: AsRef<str>>(
        &self,
        user_id: Option<&str>,
        domains: &[S],
        scan_type: ScanType,
        options: BulkOptions,
    ) -> Result<String, ScanError> {
        if domains.is_empty() {
            return Err(ScanError::Validation("Domain list is empty".to_string()));
        }
        if domains.len() > self.max_batch_size {
            return Err(ScanError::Validation(format!(
                "Too many domains: {} (maximum {})",
                domains.len(),
                self.max_batch_size
            )));
        }

        let cleaned = clean_domain_list(domains);
        if cleaned.is_empty() {
            return Err(ScanError::Validation(
                "No valid domains in the list".to_string(),
            ));
        }
        if cleaned.len() < domains.len() {
            log::info!(
                "Dropped {} invalid or duplicate domains",
                domains.len() - cleaned.len()
            );
        }

        let job_id = Uuid::new_v4().to_string();
        jobs::insert_job(&self.pool, &job_id, user_id, scan_type, &options, &cleaned).await?;
        log::info!(
            "Created bulk job {} ({} scan of {} domains)",
            job_id,
            scan_type,
            cleaned.len()
        );
        Ok(job_id)
    }

    /// Runs every unfinished task of a job, one at a time, in creation order.
    ///
    /// Tasks left `processing` by an interrupted run are scanned again. The job
    /// is re-read before each task and processing stops once it is cancelled.
    /// Returns the job as stored after the run.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `AlreadyCompleted` or `JobCancelled` for a
    /// job in a terminal state, `Persistence` if the job itself cannot be
    /// read or updated. Failures of individual tasks are recorded on the task.
    pub async fn process_job(&self, job_id: &str) -> Result<BulkJob, ScanError> {
        let job = self.get_job_status(job_id).await?;
        match job.status {
            JobStatus::Completed => return Err(ScanError::AlreadyCompleted(job_id.to_string())),
            JobStatus::Cancelled => return Err(ScanError::JobCancelled(job_id.to_string())),
            JobStatus::Pending | JobStatus::Processing => {}
        }

        jobs::mark_job_processing(&self.pool, job_id).await?;
        let tasks = jobs::fetch_unfinished_tasks(&self.pool, job_id).await?;
        log::info!(
            "Processing bulk job {}: {} of {} tasks remaining",
            job_id,
            tasks.len(),
            job.total_domains
        );

        for task in &tasks {
            match jobs::fetch_job(&self.pool, job_id).await {
                Ok(Some(current)) if current.status == JobStatus::Cancelled => {
                    log::info!("Bulk job {} was cancelled, stopping", job_id);
                    return self.get_job_status(job_id).await;
                }
                Ok(_) => {}
                Err(e) => log::warn!("Failed to re-read bulk job {}: {}", job_id, e),
            }

            self.run_task(job.scan_type, task).await;

            if let Err(e) = jobs::refresh_job_counters(&self.pool, job_id).await {
                log::error!("Failed to update counters of bulk job {}: {}", job_id, e);
            }
        }

        jobs::refresh_job_counters(&self.pool, job_id).await?;
        let remaining = jobs::fetch_unfinished_tasks(&self.pool, job_id).await?;
        if !remaining.is_empty() {
            log::warn!(
                "Bulk job {} has {} unfinished tasks, leaving it processing",
                job_id,
                remaining.len()
            );
            return self.get_job_status(job_id).await;
        }

        let completed_now = jobs::mark_job_completed(&self.pool, job_id).await?;
        let finished = self.get_job_status(job_id).await?;
        if completed_now {
            log::info!(
                "Bulk job {} completed: {} succeeded, {} failed",
                job_id,
                finished.completed,
                finished.failed
            );
            if finished.options.notify {
                self.notifier.job_completed(&finished).await;
            }
        }
        Ok(finished)
    }

    /// Scans one task and stores its outcome. Never fails: storage errors
    /// are logged and, where possible, recorded as the task's failure.
    async fn run_task(&self, scan_type: ScanType, task: &BulkTask) {
        if let Err(e) = jobs::mark_task_processing(&self.pool, task.id).await {
            log::error!("Failed to start task {} ({}): {}", task.id, task.domain, e);
            self.record_failure(task, &e.to_string()).await;
            return;
        }

        let stored = match self.orchestrator.scan_category(&task.domain, scan_type).await {
            Ok(value) => {
                log::debug!("Task {} ({}) completed", task.id, task.domain);
                jobs::complete_task(&self.pool, task.id, &value).await
            }
            Err(e) => {
                log::warn!("Task {} ({}) failed: {}", task.id, task.domain, e);
                let message = sanitize_and_truncate_error_message(&e.to_string());
                jobs::fail_task(&self.pool, task.id, &message).await
            }
        };

        if let Err(e) = stored {
            log::error!(
                "Failed to store outcome of task {} ({}): {}",
                task.id,
                task.domain,
                e
            );
            self.record_failure(task, &format!("Failed to store result: {}", e))
                .await;
        }
    }

    async fn record_failure(&self, task: &BulkTask, message: &str) {
        let message = sanitize_and_truncate_error_message(message);
        if let Err(e) = jobs::fail_task(&self.pool, task.id, &message).await {
            log::error!("Could not record failure of task {}: {}", task.id, e);
        }
    }

    /// # Errors
    ///
    /// `ScanError::NotFound` for an unknown id.
    pub async fn get_job_status(&self, job_id: &str) -> Result<BulkJob, ScanError> {
        jobs::fetch_job(&self.pool, job_id)
            .await?
            .ok_or_else(|| ScanError::NotFound(format!("bulk job {}", job_id)))
    }

    /// The job and every task, in creation order.
    pub async fn get_job_results(&self, job_id: &str) -> Result<BulkJobResults, ScanError> {
        let job = self.get_job_status(job_id).await?;
        let tasks = jobs::fetch_tasks(&self.pool, job_id).await?;
        Ok(BulkJobResults { job, tasks })
    }

    /// Jobs newest first, optionally for one user.
    pub async fn list_jobs(&self, user_id: Option<&str>) -> Result<Vec<BulkJob>, ScanError> {
        Ok(jobs::list_jobs(&self.pool, user_id).await?)
    }

    /// Cancels a pending or processing job. Returns false (and changes
    /// nothing) for completed, cancelled or unknown jobs.
    pub async fn cancel_job(&self, job_id: &str) -> Result<bool, ScanError> {
        let cancelled = jobs::cancel_job(&self.pool, job_id).await?;
        if cancelled {
            log::info!("Cancelled bulk job {}", job_id);
        } else {
            log::debug!("Bulk job {} not cancellable", job_id);
        }
        Ok(cancelled)
    }
}
