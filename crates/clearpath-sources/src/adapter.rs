//! The source adapter seam and its injected dependencies.

use crate::error::Result;
use async_trait::async_trait;
use clearpath_browser::BrowserPool;
use clearpath_core::{EntityType, SourceDescriptor, SourceResult};
use clearpath_llm::TextInterpreter;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default wall-clock budget for one source lookup.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(90);

/// One external registry.
///
/// Implementors provide the fallible [`lookup`](Self::lookup); callers use
/// [`search`](Self::search), which enforces the budget and turns every
/// failure into an `error` result.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Identity of the source.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Wall-clock budget for one search.
    fn budget(&self) -> Duration {
        DEFAULT_BUDGET
    }

    /// Query the source.
    async fn lookup(&self, name: &str, entity_type: EntityType) -> Result<SourceResult>;

    /// Query the source within its budget. Never fails.
    async fn search(&self, name: &str, entity_type: EntityType) -> SourceResult {
        let descriptor = self.descriptor();
        let budget = self.budget();

        let result = match tokio::time::timeout(budget, self.lookup(name, entity_type)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(source_id = %descriptor.id, error = %e, "source lookup failed");
                SourceResult::error(descriptor, e.note())
            }
            Err(_) => {
                warn!(source_id = %descriptor.id, budget_secs = budget.as_secs(), "source lookup timed out");
                SourceResult::error(
                    descriptor,
                    format!("Search timed out after {} seconds.", budget.as_secs()),
                )
            }
        };

        info!(
            source_id = %descriptor.id,
            availability = %result.availability,
            tier = %result.extraction_tier,
            confidence = result.confidence,
            "source search finished"
        );
        result
    }
}

/// Named secrets for sources that need them (e.g. `CA_SOS_API_KEY`).
#[derive(Clone, Default)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    /// Wrap a name-to-secret map.
    #[must_use]
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }

    /// Non-empty value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.keys()).finish()
    }
}

/// Browser timing knobs for rendered sources.
#[derive(Debug, Clone, Copy)]
pub struct RenderTimings {
    /// Wait per candidate selector
    pub selector_timeout: Duration,
    /// Tolerant wait for the page to settle after submitting
    pub settle_timeout: Duration,
}

impl Default for RenderTimings {
    fn default() -> Self {
        Self {
            selector_timeout: Duration::from_millis(5000),
            settle_timeout: Duration::from_millis(15000),
        }
    }
}

/// Process-wide dependencies injected into every adapter.
#[derive(Clone)]
pub struct SourceContext {
    /// Shared HTTP client for API and detail calls
    pub http: reqwest::Client,
    /// Bounded browser pool for rendered sources
    pub browser_pool: Option<Arc<BrowserPool>>,
    /// Interpretation capability for ambiguous pages
    pub interpreter: Option<Arc<dyn TextInterpreter>>,
    /// Source credentials
    pub credentials: Credentials,
    /// Per-source wall-clock budget
    pub budget: Duration,
    /// Page-text characters sent for interpretation
    pub excerpt_chars: usize,
    /// Browser timing knobs
    pub render: RenderTimings,
}

impl SourceContext {
    /// Context with a default client and no browser or interpreter.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            browser_pool: None,
            interpreter: None,
            credentials: Credentials::default(),
            budget: DEFAULT_BUDGET,
            excerpt_chars: crate::cascade::DEFAULT_EXCERPT_CHARS,
            render: RenderTimings::default(),
        }
    }

    /// Attach the shared browser pool.
    #[must_use]
    pub fn with_browser_pool(mut self, pool: Arc<BrowserPool>) -> Self {
        self.browser_pool = Some(pool);
        self
    }

    /// Attach the interpretation capability.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: Arc<dyn TextInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    /// Replace the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replace the per-source budget.
    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}
