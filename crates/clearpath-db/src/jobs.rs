//! Job records.
//!
//! A job row is written once on submission and afterwards only its status
//! (and completion time on reaching a terminal status) changes.

use crate::error::{DatabaseError, Result};
use clearpath_core::{EntityType, Job, JobId, JobStatus, SourceId, Timestamp};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// Insert a new job.
pub async fn create_job(pool: &Pool<Sqlite>, job: &Job) -> Result<()> {
    let sources: Vec<&str> = job.requested_sources.iter().map(SourceId::as_str).collect();

    sqlx::query(
        "INSERT INTO jobs (id, searched_name, entity_type, requested_sources, status, created_at, completed_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(job.id.as_str())
    .bind(&job.searched_name)
    .bind(job.entity_type.as_str())
    .bind(serde_json::to_string(&sources)?)
    .bind(job.status.as_str())
    .bind(job.created_at.to_rfc3339())
    .bind(job.completed_at.map(|t| t.to_rfc3339()))
    .execute(pool)
    .await?;

    tracing::debug!(job_id = %job.id, "job created");
    Ok(())
}

/// Update a job's status, stamping `completed_at` on terminal statuses.
pub async fn set_job_status(pool: &Pool<Sqlite>, id: &JobId, status: JobStatus) -> Result<()> {
    let completed_at = status.is_terminal().then(|| Timestamp::now().to_rfc3339());

    let result = sqlx::query(
        "UPDATE jobs SET status = ?, completed_at = COALESCE(?, completed_at) WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(completed_at)
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::job_not_found(id));
    }
    Ok(())
}

/// Fetch a job record.
pub async fn get_job(pool: &Pool<Sqlite>, id: &JobId) -> Result<Option<Job>> {
    let row = sqlx::query(
        "SELECT id, searched_name, entity_type, requested_sources, status, created_at, completed_at
         FROM jobs WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(|row| parse_job(&row)).transpose()
}

/// Whether a job exists.
pub async fn job_exists(pool: &Pool<Sqlite>, id: &JobId) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE id = ?")
        .bind(id.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

fn parse_job(row: &SqliteRow) -> Result<Job> {
    let id: String = row.try_get("id")?;
    let entity_type: String = row.try_get("entity_type")?;
    let sources_json: String = row.try_get("requested_sources")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let completed_at: Option<String> = row.try_get("completed_at")?;

    let requested_sources = serde_json::from_str::<Vec<String>>(&sources_json)?
        .into_iter()
        .map(SourceId::new)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| DatabaseError::decode("requested_sources", e))?;

    Ok(Job {
        id: JobId::new(id).map_err(|e| DatabaseError::decode("id", e))?,
        searched_name: row.try_get("searched_name")?,
        entity_type: entity_type
            .parse::<EntityType>()
            .map_err(|e| DatabaseError::decode("entity_type", e))?,
        requested_sources,
        status: status
            .parse::<JobStatus>()
            .map_err(|e| DatabaseError::decode("status", e))?,
        created_at: Timestamp::from_rfc3339(&created_at)
            .map_err(|e| DatabaseError::decode("created_at", e))?,
        completed_at: completed_at
            .map(|s| Timestamp::from_rfc3339(&s))
            .transpose()
            .map_err(|e| DatabaseError::decode("completed_at", e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn job() -> Job {
        Job::new(
            "Acme Ventures",
            EntityType::Llc,
            vec![
                SourceId::new("DE").expect("valid source ID"),
                SourceId::new("NY").expect("valid source ID"),
            ],
        )
    }

    #[tokio::test]
    async fn test_create_and_get_job() {
        let db = Database::in_memory().await.expect("database");
        let job = job();
        create_job(db.pool(), &job).await.expect("create job");

        let stored = get_job(db.pool(), &job.id)
            .await
            .expect("get job")
            .expect("job exists");
        assert_eq!(stored.searched_name, "Acme Ventures");
        assert_eq!(stored.entity_type, EntityType::Llc);
        assert_eq!(stored.requested_sources, job.requested_sources);
        assert_eq!(stored.status, JobStatus::Pending);
        assert_eq!(stored.completed_at, None);
    }

    #[tokio::test]
    async fn test_terminal_status_sets_completed_at() {
        let db = Database::in_memory().await.expect("database");
        let job = job();
        create_job(db.pool(), &job).await.expect("create job");

        set_job_status(db.pool(), &job.id, JobStatus::Running)
            .await
            .expect("running");
        let running = get_job(db.pool(), &job.id).await.expect("get").expect("job");
        assert_eq!(running.completed_at, None);

        set_job_status(db.pool(), &job.id, JobStatus::Complete)
            .await
            .expect("complete");
        let done = get_job(db.pool(), &job.id).await.expect("get").expect("job");
        assert_eq!(done.status, JobStatus::Complete);
        assert!(done.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_status_of_unknown_job() {
        let db = Database::in_memory().await.expect("database");
        let err = set_job_status(db.pool(), &JobId::generate(), JobStatus::Running)
            .await
            .expect_err("unknown job");
        assert!(matches!(err, DatabaseError::NotFound { entity: "job", .. }));
    }
}
