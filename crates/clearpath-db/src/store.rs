//! Store seams consumed by the orchestrator and the detail service.

use crate::error::{DatabaseError, Result};
use crate::{detail_cache, jobs, source_results, trademark_results, Database};
use async_trait::async_trait;
use clearpath_core::{
    EntityDetail, Job, JobId, JobSnapshot, JobStatus, SourceId, SourceResult, TrademarkResult,
};

/// Job/result store.
///
/// Results are append-only per job. Each append is visible to readers as
/// soon as the call returns, so a polling consumer observes partial progress
/// through [`list_results_since`](Self::list_results_since).
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job.
    async fn create_job(&self, job: &Job) -> Result<()>;

    /// Change a job's status.
    async fn set_job_status(&self, id: &JobId, status: JobStatus) -> Result<()>;

    /// Append one source result.
    async fn append_source_result(&self, id: &JobId, result: &SourceResult) -> Result<()>;

    /// Record the job's trademark-office result.
    async fn set_trademark_result(&self, id: &JobId, result: &TrademarkResult) -> Result<()>;

    /// The job with everything appended so far.
    async fn get_job(&self, id: &JobId) -> Result<JobSnapshot>;

    /// Results appended after the first `seen`, in append order.
    async fn list_results_since(&self, id: &JobId, seen: usize) -> Result<Vec<SourceResult>>;
}

/// Entity-detail cache.
#[async_trait]
pub trait DetailCache: Send + Sync {
    /// Cached detail for the key.
    async fn get_detail(&self, source_id: &SourceId, file_number: &str)
        -> Result<Option<EntityDetail>>;

    /// Store detail under `(detail.source_id, detail.file_number)`.
    async fn put_detail(&self, detail: &EntityDetail) -> Result<()>;
}

#[async_trait]
impl JobStore for Database {
    async fn create_job(&self, job: &Job) -> Result<()> {
        jobs::create_job(self.pool(), job).await
    }

    async fn set_job_status(&self, id: &JobId, status: JobStatus) -> Result<()> {
        jobs::set_job_status(self.pool(), id, status).await
    }

    async fn append_source_result(&self, id: &JobId, result: &SourceResult) -> Result<()> {
        if !jobs::job_exists(self.pool(), id).await? {
            return Err(DatabaseError::job_not_found(id));
        }
        source_results::append_source_result(self.pool(), id, result).await
    }

    async fn set_trademark_result(&self, id: &JobId, result: &TrademarkResult) -> Result<()> {
        if !jobs::job_exists(self.pool(), id).await? {
            return Err(DatabaseError::job_not_found(id));
        }
        trademark_results::set_trademark_result(self.pool(), id, result).await
    }

    async fn get_job(&self, id: &JobId) -> Result<JobSnapshot> {
        let job = jobs::get_job(self.pool(), id)
            .await?
            .ok_or_else(|| DatabaseError::job_not_found(id))?;
        let results = source_results::list_results_since(self.pool(), id, 0).await?;
        let trademark = trademark_results::get_trademark_result(self.pool(), id).await?;
        Ok(JobSnapshot {
            job,
            results,
            trademark,
        })
    }

    async fn list_results_since(&self, id: &JobId, seen: usize) -> Result<Vec<SourceResult>> {
        if !jobs::job_exists(self.pool(), id).await? {
            return Err(DatabaseError::job_not_found(id));
        }
        source_results::list_results_since(self.pool(), id, seen).await
    }
}

#[async_trait]
impl DetailCache for Database {
    async fn get_detail(
        &self,
        source_id: &SourceId,
        file_number: &str,
    ) -> Result<Option<EntityDetail>> {
        detail_cache::get_detail(self.pool(), source_id, file_number).await
    }

    async fn put_detail(&self, detail: &EntityDetail) -> Result<()> {
        detail_cache::put_detail(self.pool(), detail).await
    }
}
