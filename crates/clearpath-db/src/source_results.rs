//! Append-only per-job source results.

use crate::error::{DatabaseError, Result};
use clearpath_core::{
    Availability, EntityMatch, ExtractionTier, JobId, SourceId, SourceKind, SourceResult,
    Timestamp,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// Append a result to a job. The caller checks the job exists.
pub async fn append_source_result(
    pool: &Pool<Sqlite>,
    job_id: &JobId,
    result: &SourceResult,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO source_results (job_id, source_id, source_name, availability, confidence,
                                     raw_matches, similar_names, flags, notes, extraction_tier,
                                     source_kind, checked_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(job_id.as_str())
    .bind(result.source_id.as_str())
    .bind(&result.source_name)
    .bind(result.availability.as_str())
    .bind(result.confidence)
    .bind(serde_json::to_string(&result.raw_matches)?)
    .bind(serde_json::to_string(&result.similar_names)?)
    .bind(serde_json::to_string(&result.flags)?)
    .bind(&result.notes)
    .bind(result.extraction_tier.as_str())
    .bind(result.source_kind.as_str())
    .bind(result.checked_at.to_rfc3339())
    .execute(pool)
    .await?;

    tracing::debug!(
        job_id = %job_id,
        source_id = %result.source_id,
        availability = %result.availability,
        "source result appended"
    );
    Ok(())
}

/// Results for a job in append order, skipping the first `seen`.
pub async fn list_results_since(
    pool: &Pool<Sqlite>,
    job_id: &JobId,
    seen: usize,
) -> Result<Vec<SourceResult>> {
    let offset = i64::try_from(seen).unwrap_or(i64::MAX);
    let rows = sqlx::query(
        "SELECT source_id, source_name, availability, confidence, raw_matches, similar_names,
                flags, notes, extraction_tier, source_kind, checked_at
         FROM source_results
         WHERE job_id = ?
         ORDER BY seq
         LIMIT -1 OFFSET ?",
    )
    .bind(job_id.as_str())
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(parse_result).collect()
}

fn parse_result(row: &SqliteRow) -> Result<SourceResult> {
    let source_id: String = row.try_get("source_id")?;
    let availability: String = row.try_get("availability")?;
    let raw_matches: String = row.try_get("raw_matches")?;
    let similar_names: String = row.try_get("similar_names")?;
    let flags: String = row.try_get("flags")?;
    let tier: String = row.try_get("extraction_tier")?;
    let kind: String = row.try_get("source_kind")?;
    let checked_at: String = row.try_get("checked_at")?;

    Ok(SourceResult {
        source_id: SourceId::new(source_id).map_err(|e| DatabaseError::decode("source_id", e))?,
        source_name: row.try_get("source_name")?,
        availability: availability
            .parse::<Availability>()
            .map_err(|e| DatabaseError::decode("availability", e))?,
        confidence: row.try_get("confidence")?,
        raw_matches: serde_json::from_str::<Vec<EntityMatch>>(&raw_matches)?,
        similar_names: serde_json::from_str(&similar_names)?,
        flags: serde_json::from_str(&flags)?,
        notes: row.try_get("notes")?,
        extraction_tier: tier
            .parse::<ExtractionTier>()
            .map_err(|e| DatabaseError::decode("extraction_tier", e))?,
        source_kind: kind
            .parse::<SourceKind>()
            .map_err(|e| DatabaseError::decode("source_kind", e))?,
        checked_at: Timestamp::from_rfc3339(&checked_at)
            .map_err(|e| DatabaseError::decode("checked_at", e))?,
    })
}
