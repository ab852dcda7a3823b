//! Get-or-fetch entity detail.

use clearpath_core::{DetailOutcome, SourceId};
use clearpath_db::DetailCache;
use clearpath_sources::EntityDetailFetcher;
use std::sync::Arc;
use tracing::{debug, warn};

/// Serves entity detail from the cache, fetching and storing on a miss.
///
/// Only successful fetches are cached; a failure is retried on the next call.
/// Cache faults are logged and bypassed.
#[derive(Clone)]
pub struct DetailService {
    fetcher: Arc<dyn EntityDetailFetcher>,
    cache: Arc<dyn DetailCache>,
}

impl DetailService {
    /// Service over a fetcher and a cache.
    #[must_use]
    pub fn new(fetcher: Arc<dyn EntityDetailFetcher>, cache: Arc<dyn DetailCache>) -> Self {
        Self { fetcher, cache }
    }

    /// Detail for `file_number` in the registry behind `source_id`.
    pub async fn get_or_fetch(&self, source_id: &SourceId, file_number: &str) -> DetailOutcome {
        let file_number = file_number.trim();

        match self.cache.get_detail(source_id, file_number).await {
            Ok(Some(detail)) => {
                debug!(source_id = %source_id, file_number, "detail cache hit");
                return DetailOutcome::Found(detail);
            }
            Ok(None) => {}
            Err(e) => warn!(source_id = %source_id, file_number, error = %e, "detail cache read failed"),
        }

        let outcome = self.fetcher.fetch_detail(source_id, file_number).await;
        if let DetailOutcome::Found(detail) = &outcome {
            if let Err(e) = self.cache.put_detail(detail).await {
                warn!(source_id = %source_id, file_number, error = %e, "detail cache write failed");
            }
        }
        outcome
    }
}
