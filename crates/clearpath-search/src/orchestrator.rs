//! Search orchestrator.
//!
//! Fans a job out to every requested source adapter plus the trademark
//! check, one spawned task each. Every task persists its own result as soon
//! as it settles, so readers of the store see partial progress. The job
//! waits for all tasks; a task that panics is recorded as an `error` result
//! and never affects its siblings.

use crate::error::{Result, SearchError};
use crate::request::{validate_request, SearchRequest};
use crate::similarity::SimilarityAnalyzer;
use clearpath_core::{
    Job, JobSnapshot, JobStatus, RiskLevel, SourceDescriptor, SourceResult, Timestamp,
    TrademarkResult,
};
use clearpath_db::{DatabaseError, JobStore};
use clearpath_rules::RuleEngine;
use clearpath_sources::{SourceAdapter, SourceRegistry, TrademarkCheck};
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

const PANIC_NOTE: &str = "Internal error while searching this source.";

struct Shared {
    registry: SourceRegistry,
    rules: RuleEngine,
    analyzer: SimilarityAnalyzer,
    trademark: Arc<dyn TrademarkCheck>,
    store: Arc<dyn JobStore>,
}

/// Runs name-search jobs.
///
/// Cheap to clone; clones share the registry, rule engine and store.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
    default_sources: Vec<String>,
}

impl Orchestrator {
    /// Orchestrator over the given collaborators, defaulting to every
    /// registered source.
    #[must_use]
    pub fn new(
        registry: SourceRegistry,
        rules: RuleEngine,
        analyzer: SimilarityAnalyzer,
        trademark: Arc<dyn TrademarkCheck>,
        store: Arc<dyn JobStore>,
    ) -> Self {
        let default_sources = registry.ids().into_iter().map(String::from).collect();
        Self {
            shared: Arc::new(Shared {
                registry,
                rules,
                analyzer,
                trademark,
                store,
            }),
            default_sources,
        }
    }

    /// Replace the sources used when a request names none.
    #[must_use]
    pub fn with_default_sources(mut self, sources: Vec<String>) -> Self {
        self.default_sources = sources;
        self
    }

    /// The source registry.
    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.shared.registry
    }

    /// The job store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.shared.store
    }

    /// Validate a request and persist it as a pending job.
    pub async fn submit(&self, request: &SearchRequest) -> Result<Job> {
        let valid = validate_request(request, &self.shared.registry, &self.default_sources)?;
        let job = Job::new(valid.name, valid.entity_type, valid.sources);
        self.shared.store.create_job(&job).await?;
        info!(
            job_id = %job.id,
            name = %job.searched_name,
            entity_type = %job.entity_type,
            sources = job.requested_sources.len(),
            "job submitted"
        );
        Ok(job)
    }

    /// Submit a request and run it in the background.
    pub async fn start(&self, request: &SearchRequest) -> Result<(Job, JoinHandle<JobStatus>)> {
        let job = self.submit(request).await?;
        let orchestrator = self.clone();
        let background = job.clone();
        let handle = tokio::spawn(async move { orchestrator.run(&background).await });
        Ok((job, handle))
    }

    /// Submit a request, run it to completion and return the final snapshot.
    pub async fn search(&self, request: &SearchRequest) -> Result<JobSnapshot> {
        let job = self.submit(request).await?;
        self.run(&job).await;
        Ok(self.shared.store.get_job(&job.id).await?)
    }

    /// Run a submitted job until every task has settled.
    ///
    /// Returns the terminal status written to the store.
    pub async fn run(&self, job: &Job) -> JobStatus {
        let status = match self.fan_out(job).await {
            Ok(()) => JobStatus::Complete,
            Err(e) => {
                error!(job_id = %job.id, error = %e, "job orchestration failed");
                JobStatus::Error
            }
        };

        if let Err(e) = self.shared.store.set_job_status(&job.id, status).await {
            error!(job_id = %job.id, error = %e, "failed to record final job status");
        }
        info!(job_id = %job.id, status = %status, "job finished");
        status
    }

    async fn fan_out(&self, job: &Job) -> Result<()> {
        let store = &self.shared.store;
        store.set_job_status(&job.id, JobStatus::Running).await?;
        info!(job_id = %job.id, "job running");

        let adapters = job
            .requested_sources
            .iter()
            .map(|id| {
                self.shared
                    .registry
                    .get(id)
                    .map_err(|_| SearchError::NotRegistered {
                        source_id: id.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut descriptors = Vec::with_capacity(adapters.len());
        let mut handles = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            descriptors.push(adapter.descriptor().clone());
            let shared = Arc::clone(&self.shared);
            let job = job.clone();
            handles.push(tokio::spawn(async move {
                run_source(&shared, &job, adapter.as_ref()).await
            }));
        }

        let trademark = {
            let shared = Arc::clone(&self.shared);
            let job = job.clone();
            tokio::spawn(async move { run_trademark(&shared, &job).await })
        };

        let (source_outcomes, trademark_outcome) =
            futures::join!(join_all(handles), trademark);

        let mut store_faults = 0usize;
        for (descriptor, outcome) in descriptors.iter().zip(source_outcomes) {
            if let Err(fault) = self.settle_source(job, descriptor, outcome).await {
                error!(job_id = %job.id, source_id = %descriptor.id, error = %fault, "source result was not persisted");
                store_faults += 1;
            }
        }
        if let Err(fault) = self.settle_trademark(job, trademark_outcome).await {
            error!(job_id = %job.id, error = %fault, "trademark result was not persisted");
            store_faults += 1;
        }

        // Task-level faults never change the job outcome.
        if store_faults > 0 {
            warn!(job_id = %job.id, store_faults, "job settled with unpersisted results");
        }
        Ok(())
    }

    async fn settle_source(
        &self,
        job: &Job,
        descriptor: &SourceDescriptor,
        outcome: std::result::Result<std::result::Result<(), DatabaseError>, JoinError>,
    ) -> std::result::Result<(), DatabaseError> {
        match outcome {
            Ok(persisted) => persisted,
            Err(join_error) => {
                error!(job_id = %job.id, source_id = %descriptor.id, error = %join_error, "source task aborted");
                let flags = self.shared.rules.apply_rules(
                    &job.searched_name,
                    job.entity_type,
                    &descriptor.jurisdiction,
                );
                let result = SourceResult::error(descriptor, PANIC_NOTE).with_flags(flags);
                self.shared.store.append_source_result(&job.id, &result).await
            }
        }
    }

    async fn settle_trademark(
        &self,
        job: &Job,
        outcome: std::result::Result<std::result::Result<(), DatabaseError>, JoinError>,
    ) -> std::result::Result<(), DatabaseError> {
        match outcome {
            Ok(persisted) => persisted,
            Err(join_error) => {
                error!(job_id = %job.id, error = %join_error, "trademark task aborted");
                let result = TrademarkResult {
                    exact_matches: Vec::new(),
                    similar_marks: Vec::new(),
                    risk_level: RiskLevel::Unknown,
                    notes: "Trademark check failed unexpectedly.".to_string(),
                    checked_at: Timestamp::now(),
                };
                self.shared.store.set_trademark_result(&job.id, &result).await
            }
        }
    }
}

/// One source: search, naming rules, optional similarity, persist.
async fn run_source(
    shared: &Shared,
    job: &Job,
    adapter: &dyn SourceAdapter,
) -> std::result::Result<(), DatabaseError> {
    let descriptor = adapter.descriptor();
    debug!(job_id = %job.id, source_id = %descriptor.id, "source task started");

    let mut result = adapter.search(&job.searched_name, job.entity_type).await;

    let mut flags = shared
        .rules
        .apply_rules(&job.searched_name, job.entity_type, &descriptor.jurisdiction);

    if SimilarityAnalyzer::applies_to(&result) {
        let assessment = shared
            .analyzer
            .assess(
                &job.searched_name,
                job.entity_type,
                &descriptor.name,
                &result.similar_names,
                shared.rules.rules_summary(&descriptor.jurisdiction),
            )
            .await;
        flags.push(assessment.to_flag());
    }

    // Naming and similarity flags lead; adapter flags follow.
    flags.append(&mut result.flags);
    result.flags = flags;

    shared.store.append_source_result(&job.id, &result).await?;
    info!(
        job_id = %job.id,
        source_id = %descriptor.id,
        availability = %result.availability,
        confidence = result.confidence,
        "source result persisted"
    );
    Ok(())
}

async fn run_trademark(shared: &Shared, job: &Job) -> std::result::Result<(), DatabaseError> {
    let result = shared.trademark.check(&job.searched_name).await;
    shared.store.set_trademark_result(&job.id, &result).await?;
    debug!(job_id = %job.id, risk = %result.risk_level, "trademark result persisted");
    Ok(())
}
