//! Shared extraction cascade.
//!
//! Every page-scraping source runs its captured page through
//! [`CascadeExecutor::run`]. The tiers are tried in a fixed order:
//!
//! 1. an explicit negative phrase in the page text resolves to `available`
//! 2. the primary table strategy, classified as tier `primary`
//! 3. the fallback table strategy, classified as tier `fallback`
//! 4. the container policy, which may resolve to `available`
//! 5. escalation of a bounded text excerpt to the interpretation capability
//!
//! When escalation is impossible the result is an `error` with tier `failed`.

use crate::definition::{CascadeProfile, ContainerPolicy};
use crate::html::{scan_tables, visible_text};
use clearpath_core::{
    classify_matches, Classification, EntityType, ExtractionTier, SourceDescriptor, SourceResult,
};
use clearpath_llm::{PageQuery, TextInterpreter};
use scraper::Html;
use tracing::{debug, warn};

/// Default number of page-text characters sent for interpretation.
pub const DEFAULT_EXCERPT_CHARS: usize = 3000;

/// A results page as captured by an adapter.
#[derive(Debug, Clone)]
pub struct PageCapture {
    /// Rendered HTML
    pub html: String,
    /// Visible body text
    pub text: String,
}

impl PageCapture {
    /// Capture with text already extracted (e.g. from a live browser).
    #[must_use]
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
        }
    }

    /// Capture from raw HTML, deriving the visible text.
    #[must_use]
    pub fn from_html(html: impl Into<String>) -> Self {
        let html = html.into();
        let text = visible_text(&Html::parse_document(&html));
        Self { html, text }
    }
}

enum Extraction {
    NoResults,
    Matches(Classification, ExtractionTier),
    Ambiguous,
}

/// Runs a [`CascadeProfile`] over captured pages.
pub struct CascadeExecutor<'a> {
    descriptor: &'a SourceDescriptor,
    profile: &'a CascadeProfile,
    interpreter: Option<&'a dyn TextInterpreter>,
    excerpt_chars: usize,
}

impl<'a> CascadeExecutor<'a> {
    /// Executor without an interpreter.
    #[must_use]
    pub fn new(descriptor: &'a SourceDescriptor, profile: &'a CascadeProfile) -> Self {
        Self {
            descriptor,
            profile,
            interpreter: None,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }

    /// Interpreter used for llm escalation.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: Option<&'a dyn TextInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Characters of page text sent for interpretation.
    #[must_use]
    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }

    /// Turn a captured page into a result. Never fails.
    pub async fn run(
        &self,
        searched_name: &str,
        entity_type: EntityType,
        page: &PageCapture,
    ) -> SourceResult {
        match self.extract(searched_name, page) {
            Extraction::NoResults => SourceResult::from_classification(
                self.descriptor,
                Classification::available(format!(
                    "No matching entities found in {} registry.",
                    self.descriptor.name
                )),
                ExtractionTier::Primary,
            ),
            Extraction::Matches(classification, tier) => {
                debug!(
                    source_id = %self.descriptor.id,
                    tier = ?tier,
                    matches = classification.matches.len(),
                    "structured extraction succeeded"
                );
                SourceResult::from_classification(self.descriptor, classification, tier)
            }
            Extraction::Ambiguous => self.escalate(searched_name, entity_type, &page.text).await,
        }
    }

    fn extract(&self, searched_name: &str, page: &PageCapture) -> Extraction {
        let lowered = page.text.to_lowercase();
        if self
            .profile
            .negative_phrases
            .iter()
            .any(|phrase| lowered.contains(&phrase.to_lowercase()))
        {
            return Extraction::NoResults;
        }

        let document = Html::parse_document(&page.html);
        let mut container_found = false;

        let strategies = [
            (self.profile.primary.as_ref(), ExtractionTier::Primary),
            (self.profile.fallback.as_ref(), ExtractionTier::Fallback),
        ];
        for (strategy, tier) in strategies {
            let Some(strategy) = strategy else {
                continue;
            };
            match scan_tables(&document, strategy) {
                Ok(scan) => {
                    container_found |= scan.container_found;
                    if !scan.matches.is_empty() {
                        let classification = classify_matches(
                            searched_name,
                            scan.matches,
                            &self.profile.inactive_statuses,
                        );
                        return Extraction::Matches(classification, tier);
                    }
                }
                Err(e) => {
                    warn!(source_id = %self.descriptor.id, tier = ?tier, error = %e, "table strategy failed");
                }
            }
        }

        let policy = if container_found {
            self.profile.on_empty_container
        } else {
            self.profile.on_missing_container
        };
        match policy {
            ContainerPolicy::Available => Extraction::NoResults,
            ContainerPolicy::Escalate => Extraction::Ambiguous,
        }
    }

    async fn escalate(
        &self,
        searched_name: &str,
        entity_type: EntityType,
        page_text: &str,
    ) -> SourceResult {
        let interpreter = match self.interpreter {
            Some(interpreter) if self.profile.llm_escalation => interpreter,
            _ => {
                warn!(source_id = %self.descriptor.id, "unparseable results page and no interpreter");
                return SourceResult::error(
                    self.descriptor,
                    "Results page could not be parsed and no text interpreter is available.",
                );
            }
        };

        debug!(source_id = %self.descriptor.id, "escalating results page to interpreter");
        let query = PageQuery {
            jurisdiction: self.descriptor.name.clone(),
            searched_name: searched_name.to_string(),
            entity_type,
            page_excerpt: page_text.chars().take(self.excerpt_chars).collect(),
        };
        let interpretation = interpreter.interpret_ambiguous_page(&query).await;
        SourceResult::from_interpretation(self.descriptor, interpretation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ColumnLayout, TableStrategy};
    use async_trait::async_trait;
    use clearpath_core::{
        Availability, Clarity, PageInterpretation, SimilarityAssessment, SourceId, SourceKind,
    };
    use clearpath_llm::SimilarityQuery;
    use std::sync::Mutex;

    struct RecordingInterpreter {
        excerpts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextInterpreter for RecordingInterpreter {
        async fn interpret_ambiguous_page(&self, query: &PageQuery) -> PageInterpretation {
            self.excerpts
                .lock()
                .expect("excerpts lock")
                .push(query.page_excerpt.clone());
            PageInterpretation {
                availability: Availability::Similar,
                similar_names: vec!["Acme Ventures Group".to_string()],
                clarity: Clarity::Inferred,
                notes: "Interpreted".to_string(),
            }
        }

        async fn assess_similarity_risk(&self, query: &SimilarityQuery) -> SimilarityAssessment {
            SimilarityAssessment::degraded(&query.similar_names)
        }
    }

    fn descriptor() -> SourceDescriptor {
        SourceDescriptor {
            id: SourceId::new("FL").expect("valid source ID"),
            name: "Florida".to_string(),
            jurisdiction: "FL".to_string(),
            kind: SourceKind::Form,
            source_weight: 0.85,
        }
    }

    fn profile() -> CascadeProfile {
        CascadeProfile {
            negative_phrases: vec!["No Records".to_string()],
            primary: Some(TableStrategy {
                containers: vec!["table#results".to_string()],
                rows: "tbody tr".to_string(),
                cells: "td".to_string(),
                header_cells: "th".to_string(),
                layout: ColumnLayout::Fixed {
                    name: 0,
                    file_number: Some(1),
                    status: Some(2),
                    entity_type: None,
                    registered: None,
                },
                min_cells: 2,
                header_labels: vec![],
            }),
            fallback: Some(TableStrategy {
                containers: vec!["div.grid".to_string()],
                rows: "div.row".to_string(),
                cells: "span".to_string(),
                header_cells: "span".to_string(),
                layout: ColumnLayout::Fixed {
                    name: 0,
                    file_number: None,
                    status: None,
                    entity_type: None,
                    registered: None,
                },
                min_cells: 1,
                header_labels: vec![],
            }),
            on_missing_container: ContainerPolicy::Escalate,
            on_empty_container: ContainerPolicy::Available,
            inactive_statuses: vec!["inact".to_string()],
            llm_escalation: true,
        }
    }

    #[tokio::test]
    async fn test_negative_phrase_short_circuits() {
        let desc = descriptor();
        let profile = profile();
        let page = PageCapture::from_html(
            "<body><p>NO RECORDS found</p><table id='results'><tbody><tr><td>ACME</td><td>1</td></tr></tbody></table></body>",
        );
        let result = CascadeExecutor::new(&desc, &profile)
            .run("Acme", EntityType::Llc, &page)
            .await;
        assert_eq!(result.availability, Availability::Available);
        assert_eq!(result.extraction_tier, ExtractionTier::Primary);
        assert!((result.confidence - 0.96).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_primary_rows_are_classified() {
        let desc = descriptor();
        let profile = profile();
        let page = PageCapture::from_html(
            "<table id='results'><tbody>\
             <tr><td>ACME VENTURES</td><td>L1</td><td>INACT</td></tr>\
             <tr><td>ACME VENTURES GROUP</td><td>L2</td><td>Active</td></tr>\
             </tbody></table>",
        );
        let result = CascadeExecutor::new(&desc, &profile)
            .run("Acme Ventures", EntityType::Llc, &page)
            .await;
        assert_eq!(result.availability, Availability::Taken);
        assert_eq!(result.extraction_tier, ExtractionTier::Primary);
        assert_eq!(result.similar_names, vec!["ACME VENTURES GROUP".to_string()]);
        assert!(result.notes.contains("inactive"));
    }

    #[tokio::test]
    async fn test_fallback_strategy_tier() {
        let desc = descriptor();
        let profile = profile();
        let page = PageCapture::from_html(
            "<div class='grid'><div class='row'><span>Acme Ventures Group</span></div></div>",
        );
        let result = CascadeExecutor::new(&desc, &profile)
            .run("Acme Ventures", EntityType::Llc, &page)
            .await;
        assert_eq!(result.availability, Availability::Similar);
        assert_eq!(result.extraction_tier, ExtractionTier::Fallback);
        // fallback 0.7, weight 0.85, inferred 0.7
        assert!((result.confidence - 0.77).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_container_policy() {
        let desc = descriptor();
        let profile = profile();
        let page = PageCapture::from_html("<table id='results'><tbody></tbody></table>");
        let result = CascadeExecutor::new(&desc, &profile)
            .run("Acme", EntityType::Llc, &page)
            .await;
        assert_eq!(result.availability, Availability::Available);
        assert!(result.notes.contains("Florida"));
    }

    #[tokio::test]
    async fn test_escalates_bounded_excerpt() {
        let desc = descriptor();
        let profile = profile();
        let interpreter = RecordingInterpreter {
            excerpts: Mutex::new(Vec::new()),
        };
        let page = PageCapture::new("<p>odd layout</p>", "x".repeat(5000));
        let result = CascadeExecutor::new(&desc, &profile)
            .with_interpreter(Some(&interpreter))
            .run("Acme", EntityType::Llc, &page)
            .await;

        assert_eq!(result.extraction_tier, ExtractionTier::Llm);
        assert_eq!(result.availability, Availability::Similar);
        // llm 0.4, weight 0.85, inferred 0.7
        assert!((result.confidence - 0.65).abs() < 1e-9);
        let excerpts = interpreter.excerpts.lock().expect("excerpts lock");
        assert_eq!(excerpts[0].len(), DEFAULT_EXCERPT_CHARS);
    }

    #[tokio::test]
    async fn test_no_interpreter_is_error() {
        let desc = descriptor();
        let profile = profile();
        let page = PageCapture::from_html("<p>odd layout</p>");
        let result = CascadeExecutor::new(&desc, &profile)
            .run("Acme", EntityType::Llc, &page)
            .await;
        assert_eq!(result.availability, Availability::Error);
        assert_eq!(result.extraction_tier, ExtractionTier::Failed);
        assert!((result.confidence - 0.1).abs() < 1e-9);
    }
}
