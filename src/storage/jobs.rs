//! Bulk job and task persistence.
//!
//! Every write is a single statement (or one transaction for job creation),
//! so a crash between tasks leaves the job resumable: unfinished tasks stay
//! `pending` or `processing` and are picked up by the next `process_job`.

use chrono::Utc;
use sqlx::SqlitePool;

use super::models::{BulkJob, BulkOptions, BulkTask, JobStatus, TaskStatus};
use crate::config::ScanType;
use crate::error_handling::DatabaseError;

const JOB_COLUMNS: &str = "id, user_id, scan_type, options, status, total_domains, completed, \
                           failed, created_at_ms, started_at_ms, completed_at_ms";
const TASK_COLUMNS: &str =
    "id, job_id, domain, status, result, error, started_at_ms, completed_at_ms";

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Inserts a pending job and one pending task per domain in one transaction.
pub async fn insert_job(
    pool: &SqlitePool,
    job_id: &str,
    user_id: Option<&str>,
    scan_type: ScanType,
    options: &BulkOptions,
    domains: &[String],
) -> Result<(), DatabaseError> {
    let options_json = serde_json::to_string(options)?;
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO bulk_jobs (id, user_id, scan_type, options, status, total_domains, created_at_ms)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(job_id)
    .bind(user_id)
    .bind(scan_type.to_string())
    .bind(options_json)
    .bind(JobStatus::Pending.to_string())
    .bind(domains.len() as i64)
    .bind(now_ms())
    .execute(&mut *tx)
    .await?;

    for domain in domains {
        sqlx::query("INSERT INTO bulk_tasks (job_id, domain, status) VALUES (?, ?, ?)")
            .bind(job_id)
            .bind(domain)
            .bind(TaskStatus::Pending.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn fetch_job(pool: &SqlitePool, job_id: &str) -> Result<Option<BulkJob>, DatabaseError> {
    let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM bulk_jobs WHERE id = ?"))
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(BulkJob::try_from).transpose()
}

/// Jobs newest first, optionally restricted to one user.
pub async fn list_jobs(
    pool: &SqlitePool,
    user_id: Option<&str>,
) -> Result<Vec<BulkJob>, DatabaseError> {
    let mut query_builder =
        sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!("SELECT {JOB_COLUMNS} FROM bulk_jobs"));
    if let Some(user_id) = user_id {
        query_builder.push(" WHERE user_id = ");
        query_builder.push_bind(user_id);
    }
    query_builder.push(" ORDER BY created_at_ms DESC, rowid DESC");

    let rows = query_builder.build().fetch_all(pool).await?;
    rows.iter().map(BulkJob::try_from).collect()
}

/// All tasks of a job in creation order.
pub async fn fetch_tasks(pool: &SqlitePool, job_id: &str) -> Result<Vec<BulkTask>, DatabaseError> {
    let rows = sqlx::query(&format!(
        "SELECT {TASK_COLUMNS} FROM bulk_tasks WHERE job_id = ? ORDER BY id"
    ))
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    rows.iter().map(BulkTask::try_from).collect()
}

/// Tasks still `pending`, or left `processing` by an interrupted run.
pub async fn fetch_unfinished_tasks(
    pool: &SqlitePool,
    job_id: &str,
) -> Result<Vec<BulkTask>, DatabaseError> {
    let rows = sqlx::query(&format!(
        "SELECT {TASK_COLUMNS} FROM bulk_tasks
         WHERE job_id = ? AND status IN ('pending', 'processing')
         ORDER BY id"
    ))
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    rows.iter().map(BulkTask::try_from).collect()
}

/// Moves a pending job to `processing`. Keeps the first start time when a
/// job is resumed.
pub async fn mark_job_processing(pool: &SqlitePool, job_id: &str) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE bulk_jobs
         SET status = 'processing', started_at_ms = COALESCE(started_at_ms, ?)
         WHERE id = ? AND status IN ('pending', 'processing')",
    )
    .bind(now_ms())
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Marks a processing job completed. Returns false if the job was no longer
/// processing (for example cancelled in the meantime).
pub async fn mark_job_completed(pool: &SqlitePool, job_id: &str) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE bulk_jobs SET status = 'completed', completed_at_ms = ?
         WHERE id = ? AND status = 'processing'",
    )
    .bind(now_ms())
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Cancels a pending or processing job. Returns false for unknown, completed
/// or already cancelled jobs.
pub async fn cancel_job(pool: &SqlitePool, job_id: &str) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE bulk_jobs SET status = 'cancelled', completed_at_ms = ?
         WHERE id = ? AND status IN ('pending', 'processing')",
    )
    .bind(now_ms())
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_task_processing(pool: &SqlitePool, task_id: i64) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE bulk_tasks SET status = 'processing', started_at_ms = ?, error = NULL WHERE id = ?",
    )
    .bind(now_ms())
    .bind(task_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn complete_task(
    pool: &SqlitePool,
    task_id: i64,
    result: &serde_json::Value,
) -> Result<(), DatabaseError> {
    let result_json = serde_json::to_string(result)?;
    sqlx::query(
        "UPDATE bulk_tasks SET status = 'completed', result = ?, error = NULL, completed_at_ms = ?
         WHERE id = ?",
    )
    .bind(result_json)
    .bind(now_ms())
    .bind(task_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// `error` must already be sanitized.
pub async fn fail_task(pool: &SqlitePool, task_id: i64, error: &str) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE bulk_tasks SET status = 'failed', result = NULL, error = ?, completed_at_ms = ?
         WHERE id = ?",
    )
    .bind(error)
    .bind(now_ms())
    .bind(task_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Recomputes the job's completed/failed counters from its tasks.
pub async fn refresh_job_counters(pool: &SqlitePool, job_id: &str) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE bulk_jobs SET
            completed = (SELECT COUNT(*) FROM bulk_tasks WHERE job_id = ? AND status = 'completed'),
            failed = (SELECT COUNT(*) FROM bulk_tasks WHERE job_id = ? AND status = 'failed')
         WHERE id = ?",
    )
    .bind(job_id)
    .bind(job_id)
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(())
}
