//! Deceptive-similarity risk analysis for `similar` results.

use clearpath_core::{Availability, EntityType, SimilarityAssessment, SourceResult};
use clearpath_llm::{SimilarityQuery, TextInterpreter};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of similar names sent for assessment.
pub const DEFAULT_NAME_LIMIT: usize = 10;

/// Delegates similarity assessment to the interpretation capability.
///
/// Never fails: without an interpreter the degraded assessment is returned.
#[derive(Clone)]
pub struct SimilarityAnalyzer {
    interpreter: Option<Arc<dyn TextInterpreter>>,
    name_limit: usize,
}

impl SimilarityAnalyzer {
    /// Analyzer over an optional interpreter.
    #[must_use]
    pub fn new(interpreter: Option<Arc<dyn TextInterpreter>>) -> Self {
        Self {
            interpreter,
            name_limit: DEFAULT_NAME_LIMIT,
        }
    }

    /// Cap on similar names per query.
    #[must_use]
    pub fn with_name_limit(mut self, limit: usize) -> Self {
        self.name_limit = limit.max(1);
        self
    }

    /// Whether a result calls for assessment.
    #[must_use]
    pub fn applies_to(result: &SourceResult) -> bool {
        result.availability == Availability::Similar && !result.similar_names.is_empty()
    }

    /// Assess `searched_name` against the first similar names.
    pub async fn assess(
        &self,
        searched_name: &str,
        entity_type: EntityType,
        jurisdiction: &str,
        similar_names: &[String],
        rules_summary: &str,
    ) -> SimilarityAssessment {
        let names: Vec<String> = similar_names.iter().take(self.name_limit).cloned().collect();

        let Some(interpreter) = &self.interpreter else {
            warn!(jurisdiction, "no text interpreter configured, similarity assessment degraded");
            return SimilarityAssessment::degraded(&names);
        };

        debug!(jurisdiction, names = names.len(), "assessing similarity risk");
        interpreter
            .assess_similarity_risk(&SimilarityQuery {
                searched_name: searched_name.to_string(),
                entity_type,
                jurisdiction: jurisdiction.to_string(),
                similar_names: names,
                rules_summary: rules_summary.to_string(),
            })
            .await
    }
}
