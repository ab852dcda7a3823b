//! Cached entity detail keyed by `(source_id, file_number)`.

use crate::error::Result;
use clearpath_core::{EntityDetail, SourceId, Timestamp};
use sqlx::{Pool, Sqlite};

/// Cached detail, if present.
pub async fn get_detail(
    pool: &Pool<Sqlite>,
    source_id: &SourceId,
    file_number: &str,
) -> Result<Option<EntityDetail>> {
    let detail: Option<String> = sqlx::query_scalar(
        "SELECT detail FROM detail_cache WHERE source_id = ? AND file_number = ?",
    )
    .bind(source_id.as_str())
    .bind(file_number)
    .fetch_optional(pool)
    .await?;

    Ok(detail.map(|json| serde_json::from_str(&json)).transpose()?)
}

/// Store detail, replacing any earlier entry for the same key.
pub async fn put_detail(pool: &Pool<Sqlite>, detail: &EntityDetail) -> Result<()> {
    sqlx::query(
        "INSERT INTO detail_cache (source_id, file_number, detail, fetched_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(source_id, file_number) DO UPDATE SET detail = excluded.detail, fetched_at = excluded.fetched_at",
    )
    .bind(detail.source_id.as_str())
    .bind(&detail.file_number)
    .bind(serde_json::to_string(detail)?)
    .bind(Timestamp::now().to_rfc3339())
    .execute(pool)
    .await?;

    tracing::debug!(source_id = %detail.source_id, file_number = %detail.file_number, "detail cached");
    Ok(())
}
