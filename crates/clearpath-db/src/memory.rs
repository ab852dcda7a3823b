//! In-process store for tests and ephemeral runs.

use crate::error::{DatabaseError, Result};
use crate::store::{DetailCache, JobStore};
use async_trait::async_trait;
use clearpath_core::{
    EntityDetail, Job, JobId, JobSnapshot, JobStatus, SourceId, SourceResult, Timestamp,
    TrademarkResult,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct JobEntry {
    job: Job,
    results: Vec<SourceResult>,
    trademark: Option<TrademarkResult>,
}

/// [`JobStore`] and [`DetailCache`] backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<JobId, JobEntry>>,
    details: RwLock<HashMap<(SourceId, String), EntityDetail>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, job: &Job) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(DatabaseError::AlreadyRecorded {
                entity: "job",
                id: job.id.to_string(),
            });
        }
        jobs.insert(
            job.id.clone(),
            JobEntry {
                job: job.clone(),
                results: Vec::new(),
                trademark: None,
            },
        );
        Ok(())
    }

    async fn set_job_status(&self, id: &JobId, status: JobStatus) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs
            .get_mut(id)
            .ok_or_else(|| DatabaseError::job_not_found(id))?;
        entry.job.status = status;
        if status.is_terminal() {
            entry.job.completed_at = Some(Timestamp::now());
        }
        Ok(())
    }

    async fn append_source_result(&self, id: &JobId, result: &SourceResult) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs
            .get_mut(id)
            .ok_or_else(|| DatabaseError::job_not_found(id))?;
        entry.results.push(result.clone());
        Ok(())
    }

    async fn set_trademark_result(&self, id: &JobId, result: &TrademarkResult) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs
            .get_mut(id)
            .ok_or_else(|| DatabaseError::job_not_found(id))?;
        if entry.trademark.is_some() {
            return Err(DatabaseError::AlreadyRecorded {
                entity: "trademark result",
                id: id.to_string(),
            });
        }
        entry.trademark = Some(result.clone());
        Ok(())
    }

    async fn get_job(&self, id: &JobId) -> Result<JobSnapshot> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(id).ok_or_else(|| DatabaseError::job_not_found(id))?;
        Ok(JobSnapshot {
            job: entry.job.clone(),
            results: entry.results.clone(),
            trademark: entry.trademark.clone(),
        })
    }

    async fn list_results_since(&self, id: &JobId, seen: usize) -> Result<Vec<SourceResult>> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(id).ok_or_else(|| DatabaseError::job_not_found(id))?;
        Ok(entry.results.iter().skip(seen).cloned().collect())
    }
}

#[async_trait]
impl DetailCache for MemoryStore {
    async fn get_detail(
        &self,
        source_id: &SourceId,
        file_number: &str,
    ) -> Result<Option<EntityDetail>> {
        Ok(self
            .details
            .read()
            .await
            .get(&(source_id.clone(), file_number.to_string()))
            .cloned())
    }

    async fn put_detail(&self, detail: &EntityDetail) -> Result<()> {
        self.details.write().await.insert(
            (detail.source_id.clone(), detail.file_number.clone()),
            detail.clone(),
        );
        Ok(())
    }
}
