//! The single trademark-office result of a job.

use crate::error::{DatabaseError, Result};
use clearpath_core::{JobId, RiskLevel, Timestamp, TrademarkResult};
use sqlx::{Pool, Row, Sqlite};

/// Record the trademark result. A job holds at most one.
pub async fn set_trademark_result(
    pool: &Pool<Sqlite>,
    job_id: &JobId,
    result: &TrademarkResult,
) -> Result<()> {
    let inserted = sqlx::query(
        "INSERT INTO trademark_results (job_id, exact_matches, similar_marks, risk_level, notes, checked_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(job_id) DO NOTHING",
    )
    .bind(job_id.as_str())
    .bind(serde_json::to_string(&result.exact_matches)?)
    .bind(serde_json::to_string(&result.similar_marks)?)
    .bind(result.risk_level.as_str())
    .bind(&result.notes)
    .bind(result.checked_at.to_rfc3339())
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(DatabaseError::AlreadyRecorded {
            entity: "trademark result",
            id: job_id.to_string(),
        });
    }
    Ok(())
}

/// Trademark result of a job, if recorded.
pub async fn get_trademark_result(
    pool: &Pool<Sqlite>,
    job_id: &JobId,
) -> Result<Option<TrademarkResult>> {
    let Some(row) = sqlx::query(
        "SELECT exact_matches, similar_marks, risk_level, notes, checked_at
         FROM trademark_results WHERE job_id = ?",
    )
    .bind(job_id.as_str())
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let exact_matches: String = row.try_get("exact_matches")?;
    let similar_marks: String = row.try_get("similar_marks")?;
    let risk_level: String = row.try_get("risk_level")?;
    let checked_at: String = row.try_get("checked_at")?;

    Ok(Some(TrademarkResult {
        exact_matches: serde_json::from_str(&exact_matches)?,
        similar_marks: serde_json::from_str(&similar_marks)?,
        risk_level: risk_level
            .parse::<RiskLevel>()
            .map_err(|e| DatabaseError::decode("risk_level", e))?,
        notes: row.try_get("notes")?,
        checked_at: Timestamp::from_rfc3339(&checked_at)
            .map_err(|e| DatabaseError::decode("checked_at", e))?,
    }))
}
