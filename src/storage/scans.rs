//! Saved complete scans, backing the `history` command.

use sqlx::{Row, SqlitePool};

use super::models::ScanSummary;
use crate::error_handling::DatabaseError;
use crate::scan::ScanResult;

/// Stores a complete scan. Saving the same `scan_id` twice replaces it.
pub async fn save_scan(pool: &SqlitePool, result: &ScanResult) -> Result<(), DatabaseError> {
    let body = serde_json::to_string(result)?;
    sqlx::query(
        "INSERT OR REPLACE INTO scan_history (scan_id, domain, overall_score, grade, scanned_at_ms, result)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&result.scan_id)
    .bind(&result.domain)
    .bind(result.overall_score.score)
    .bind(result.overall_score.grade.to_string())
    .bind(result.scan_date.timestamp_millis())
    .bind(body)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn load_scan(pool: &SqlitePool, scan_id: &str) -> Result<Option<ScanResult>, DatabaseError> {
    let row = sqlx::query("SELECT result FROM scan_history WHERE scan_id = ?")
        .bind(scan_id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => {
            let body: String = row.try_get("result")?;
            Ok(Some(serde_json::from_str(&body)?))
        }
        None => Ok(None),
    }
}

/// Most recent scans first, optionally for one domain.
pub async fn list_scans(
    pool: &SqlitePool,
    domain: Option<&str>,
    limit: i64,
) -> Result<Vec<ScanSummary>, DatabaseError> {
    let mut query_builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
        "SELECT scan_id, domain, overall_score, grade, scanned_at_ms FROM scan_history",
    );
    if let Some(domain) = domain {
        query_builder.push(" WHERE domain = ");
        query_builder.push_bind(domain);
    }
    query_builder.push(" ORDER BY scanned_at_ms DESC, rowid DESC LIMIT ");
    query_builder.push_bind(limit);

    let rows = query_builder.build().fetch_all(pool).await?;
    rows.iter().map(ScanSummary::try_from).collect()
}
