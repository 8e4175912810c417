// storage/models.rs
// Bulk job, bulk task and scan history records

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use strum_macros::{Display, EnumString};

use crate::config::ScanType;
use crate::error_handling::DatabaseError;

/// Lifecycle of a bulk job.
///
/// `pending -> processing -> completed`; `pending | processing -> cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Completed and cancelled jobs are never processed again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }
}

/// Lifecycle of one domain inside a bulk job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Caller options stored with a bulk job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkOptions {
    /// Invoke the completion notifier when the job completes
    pub notify: bool,
    /// Accepted for compatibility; tasks always run one at a time
    pub max_concurrent: Option<usize>,
    /// Free-form label shown in listings
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkJob {
    pub id: String,
    pub user_id: Option<String>,
    pub scan_type: ScanType,
    pub options: BulkOptions,
    pub status: JobStatus,
    pub total_domains: i64,
    pub completed: i64,
    pub failed: i64,
    pub created_at_ms: i64,
    pub started_at_ms: Option<i64>,
    pub completed_at_ms: Option<i64>,
}

impl BulkJob {
    /// Share of tasks that reached a terminal state, 0-100.
    pub fn progress_percent(&self) -> f64 {
        if self.total_domains == 0 {
            return 100.0;
        }
        crate::utils::round2((self.completed + self.failed) as f64 / self.total_domains as f64 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTask {
    pub id: i64,
    pub job_id: String,
    pub domain: String,
    pub status: TaskStatus,
    /// JSON of the scan output, set when completed
    pub result: Option<serde_json::Value>,
    /// Sanitized failure message, set when failed
    pub error: Option<String>,
    pub started_at_ms: Option<i64>,
    pub completed_at_ms: Option<i64>,
}

/// One row of the saved scan history (without the stored result body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: String,
    pub domain: String,
    pub overall_score: f64,
    pub grade: String,
    pub scanned_at_ms: i64,
}

fn parse_column<T: FromStr>(row: &SqliteRow, column: &str) -> Result<T, DatabaseError> {
    let raw: String = row.try_get(column)?;
    T::from_str(&raw)
        .map_err(|_| DatabaseError::CorruptRecord(format!("unexpected {} value '{}'", column, raw)))
}

impl TryFrom<&SqliteRow> for BulkJob {
    type Error = DatabaseError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let options: String = row.try_get("options")?;
        Ok(BulkJob {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            scan_type: parse_column(row, "scan_type")?,
            options: serde_json::from_str(&options)?,
            status: parse_column(row, "status")?,
            total_domains: row.try_get("total_domains")?,
            completed: row.try_get("completed")?,
            failed: row.try_get("failed")?,
            created_at_ms: row.try_get("created_at_ms")?,
            started_at_ms: row.try_get("started_at_ms")?,
            completed_at_ms: row.try_get("completed_at_ms")?,
        })
    }
}

impl TryFrom<&SqliteRow> for BulkTask {
    type Error = DatabaseError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let result: Option<String> = row.try_get("result")?;
        Ok(BulkTask {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            domain: row.try_get("domain")?,
            status: parse_column(row, "status")?,
            result: result.as_deref().map(serde_json::from_str).transpose()?,
            error: row.try_get("error")?,
            started_at_ms: row.try_get("started_at_ms")?,
            completed_at_ms: row.try_get("completed_at_ms")?,
        })
    }
}

impl TryFrom<&SqliteRow> for ScanSummary {
    type Error = DatabaseError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(ScanSummary {
            scan_id: row.try_get("scan_id")?,
            domain: row.try_get("domain")?,
            overall_score: row.try_get("overall_score")?,
            grade: row.try_get("grade")?,
            scanned_at_ms: row.try_get("scanned_at_ms")?,
        })
    }
}
