//! Text interpretation operations.
//!
//! [`TextInterpreter`] is the seam the search engine depends on. The
//! model-backed implementation never returns an error: any failure yields the
//! fixed degraded values defined on [`PageInterpretation`] and
//! [`SimilarityAssessment`].

use crate::prompts;
use crate::provider::{CompletionRequest, LlmProvider};
use async_trait::async_trait;
use clearpath_core::{
    Availability, Clarity, EntityType, LlmConfig, PageInterpretation, RiskLevel,
    SimilarityAssessment,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Input for ambiguous page interpretation.
#[derive(Debug, Clone)]
pub struct PageQuery {
    /// Human-readable jurisdiction or source name
    pub jurisdiction: String,
    /// Name that was searched
    pub searched_name: String,
    /// Entity type that was searched
    pub entity_type: EntityType,
    /// Bounded excerpt of the page text
    pub page_excerpt: String,
}

/// Input for deceptive-similarity assessment.
#[derive(Debug, Clone)]
pub struct SimilarityQuery {
    /// Name that was searched
    pub searched_name: String,
    /// Entity type that was searched
    pub entity_type: EntityType,
    /// Registry name shown to the model, e.g. "Delaware"
    pub jurisdiction: String,
    /// Similar names already registered
    pub similar_names: Vec<String>,
    /// Plain-language naming rules for the jurisdiction
    pub rules_summary: String,
}

/// The interpretation capability.
#[async_trait]
pub trait TextInterpreter: Send + Sync {
    /// Read a results page that no structured strategy could parse.
    async fn interpret_ambiguous_page(&self, query: &PageQuery) -> PageInterpretation;

    /// Assess whether the searched name is confusable with the similar names.
    async fn assess_similarity_risk(&self, query: &SimilarityQuery) -> SimilarityAssessment;
}

/// Interpreter backed by an [`LlmProvider`].
pub struct LlmInterpreter {
    provider: Arc<dyn LlmProvider>,
    page_model: String,
    similarity_model: String,
    page_max_tokens: u32,
    similarity_max_tokens: u32,
}

impl LlmInterpreter {
    /// Interpreter using the default models.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::from_config(provider, &LlmConfig::default())
    }

    /// Interpreter using the models and token caps from `config`.
    #[must_use]
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            page_model: config.page_model.clone(),
            similarity_model: config.similarity_model.clone(),
            page_max_tokens: config.page_max_tokens,
            similarity_max_tokens: config.similarity_max_tokens,
        }
    }

    async fn complete_text(&self, prompt: String, model: &str, max_tokens: u32) -> Option<String> {
        let request = CompletionRequest::new(prompt)
            .with_model(model)
            .with_max_tokens(max_tokens)
            .with_temperature(0.0);
        match self.provider.complete(request).await {
            Ok(response) => {
                if response.is_truncated() {
                    warn!(provider = self.provider.provider_id(), model, max_tokens, "reply hit the token ceiling");
                }
                Some(response.content)
            }
            Err(e) => {
                warn!(provider = self.provider.provider_id(), model, error = %e, "completion failed");
                None
            }
        }
    }
}

#[async_trait]
impl TextInterpreter for LlmInterpreter {
    async fn interpret_ambiguous_page(&self, query: &PageQuery) -> PageInterpretation {
        let prompt = prompts::page_interpretation(query);
        let Some(text) = self
            .complete_text(prompt, &self.page_model, self.page_max_tokens)
            .await
        else {
            return PageInterpretation::degraded();
        };

        parse_page_interpretation(&text).unwrap_or_else(|| {
            debug!(jurisdiction = %query.jurisdiction, "unparseable page interpretation");
            PageInterpretation::degraded()
        })
    }

    async fn assess_similarity_risk(&self, query: &SimilarityQuery) -> SimilarityAssessment {
        let prompt = prompts::similarity_risk(query);
        let Some(text) = self
            .complete_text(prompt, &self.similarity_model, self.similarity_max_tokens)
            .await
        else {
            return SimilarityAssessment::degraded(&query.similar_names);
        };

        parse_similarity_assessment(&text, &query.similar_names).unwrap_or_else(|| {
            debug!(jurisdiction = %query.jurisdiction, "unparseable similarity assessment");
            SimilarityAssessment::degraded(&query.similar_names)
        })
    }
}

/// Slice from the first `{` to the last `}`.
///
/// Models sometimes wrap JSON in prose or code fences.
fn json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[derive(Debug, Deserialize)]
struct RawPage {
    availability: String,
    #[serde(default)]
    similar_names: Vec<String>,
    #[serde(default)]
    clarity: String,
    #[serde(default)]
    notes: String,
}

/// Parse a page interpretation; `None` if the output is unusable.
///
/// An unrecognised availability rejects the whole reading. An unrecognised
/// clarity is read as ambiguous. `error` is not a verdict the model may give.
pub fn parse_page_interpretation(text: &str) -> Option<PageInterpretation> {
    let raw: RawPage = serde_json::from_str(json_object(text)?).ok()?;
    let availability = raw.availability.parse::<Availability>().ok()?;
    if availability == Availability::Error {
        return None;
    }
    let clarity = raw.clarity.parse::<Clarity>().unwrap_or(Clarity::Ambiguous);
    Some(PageInterpretation {
        availability,
        similar_names: raw.similar_names,
        clarity,
        notes: raw.notes,
    })
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    risk_level: String,
    conflicting_names: Option<Vec<String>>,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    recommendation: String,
}

/// Parse a similarity assessment; `None` if the output is unusable.
pub fn parse_similarity_assessment(
    text: &str,
    similar_names: &[String],
) -> Option<SimilarityAssessment> {
    let raw: RawAssessment = serde_json::from_str(json_object(text)?).ok()?;
    let risk_level = raw.risk_level.parse::<RiskLevel>().unwrap_or(RiskLevel::Unknown);
    Some(SimilarityAssessment {
        risk_level,
        conflicting_names: raw
            .conflicting_names
            .unwrap_or_else(|| similar_names.to_vec()),
        explanation: raw.explanation,
        recommendation: raw.recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, Result};
    use crate::provider::CompletionResponse;
    use std::sync::Mutex;

    /// Provider that replays a fixed reply and records requests.
    struct ScriptedProvider {
        reply: Option<String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            self.requests.lock().expect("lock requests").push(request);
            match &self.reply {
                Some(reply) => Ok(CompletionResponse {
                    content: reply.clone(),
                    model: "scripted".to_string(),
                    stop_reason: None,
                    usage: None,
                }),
                None => Err(LlmError::Internal("scripted failure".to_string())),
            }
        }

        fn provider_id(&self) -> &str {
            "scripted"
        }
    }

    fn page_query() -> PageQuery {
        PageQuery {
            jurisdiction: "Delaware".to_string(),
            searched_name: "Acme Ventures".to_string(),
            entity_type: EntityType::Llc,
            page_excerpt: "Results: ACME VENTURES HOLDINGS".to_string(),
        }
    }

    fn similarity_query() -> SimilarityQuery {
        SimilarityQuery {
            searched_name: "Acme Ventures".to_string(),
            entity_type: EntityType::Llc,
            jurisdiction: "DE".to_string(),
            similar_names: vec!["ACME VENTURES HOLDINGS".to_string(), "ACME VENTURE".to_string()],
            rules_summary: "summary".to_string(),
        }
    }

    #[tokio::test]
    async fn test_page_interpretation_adopts_model_reading() {
        let provider = ScriptedProvider::replying(
            r#"{"availability": "similar", "similar_names": ["ACME VENTURES HOLDINGS"], "clarity": "inferred", "notes": "One close name."}"#,
        );
        let interpreter = LlmInterpreter::new(provider.clone());
        let reading = interpreter.interpret_ambiguous_page(&page_query()).await;

        assert_eq!(reading.availability, Availability::Similar);
        assert_eq!(reading.clarity, Clarity::Inferred);
        assert_eq!(reading.similar_names, vec!["ACME VENTURES HOLDINGS"]);

        let requests = provider.requests.lock().expect("lock requests");
        assert_eq!(requests[0].model.as_deref(), Some("claude-haiku-4-5-20251001"));
        assert_eq!(requests[0].max_tokens, Some(300));
    }

    #[tokio::test]
    async fn test_page_interpretation_tolerates_fenced_json() {
        let provider = ScriptedProvider::replying(
            "Here you go:\n```json\n{\"availability\": \"available\", \"clarity\": \"clear\", \"notes\": \"No rows.\"}\n```",
        );
        let reading = LlmInterpreter::new(provider)
            .interpret_ambiguous_page(&page_query())
            .await;
        assert_eq!(reading.availability, Availability::Available);
        assert!(reading.similar_names.is_empty());
    }

    #[tokio::test]
    async fn test_page_interpretation_degrades_on_prose() {
        let provider = ScriptedProvider::replying("I could not tell from this page.");
        let reading = LlmInterpreter::new(provider)
            .interpret_ambiguous_page(&page_query())
            .await;
        assert_eq!(reading, PageInterpretation::degraded());
    }

    #[tokio::test]
    async fn test_page_interpretation_degrades_on_provider_error() {
        let reading = LlmInterpreter::new(ScriptedProvider::failing())
            .interpret_ambiguous_page(&page_query())
            .await;
        assert_eq!(reading, PageInterpretation::degraded());
    }

    #[test]
    fn test_page_parse_rejects_unknown_or_error_verdicts() {
        assert!(parse_page_interpretation(r#"{"availability": "maybe"}"#).is_none());
        assert!(parse_page_interpretation(r#"{"availability": "error"}"#).is_none());
        let reading = parse_page_interpretation(r#"{"availability": "taken", "clarity": "sure"}"#)
            .expect("parse reading");
        assert_eq!(reading.clarity, Clarity::Ambiguous);
    }

    #[tokio::test]
    async fn test_similarity_assessment_parsed() {
        let provider = ScriptedProvider::replying(
            r#"{"risk_level": "high", "conflicting_names": ["ACME VENTURE"], "explanation": "Differs by one letter.", "recommendation": "Pick another name."}"#,
        );
        let interpreter = LlmInterpreter::new(provider.clone());
        let assessment = interpreter.assess_similarity_risk(&similarity_query()).await;

        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.conflicting_names, vec!["ACME VENTURE"]);

        let requests = provider.requests.lock().expect("lock requests");
        assert_eq!(requests[0].model.as_deref(), Some("claude-sonnet-4-6"));
        assert_eq!(requests[0].max_tokens, Some(400));
    }

    #[tokio::test]
    async fn test_similarity_assessment_degrades() {
        let query = similarity_query();
        let assessment = LlmInterpreter::new(ScriptedProvider::replying("{not json"))
            .assess_similarity_risk(&query)
            .await;
        assert_eq!(assessment, SimilarityAssessment::degraded(&query.similar_names));

        let assessment = LlmInterpreter::new(ScriptedProvider::failing())
            .assess_similarity_risk(&query)
            .await;
        assert_eq!(assessment.risk_level, RiskLevel::Unknown);
        assert_eq!(assessment.conflicting_names, query.similar_names);
    }

    #[test]
    fn test_missing_conflicts_fall_back_to_similar_names() {
        let names = vec!["A".to_string()];
        let assessment =
            parse_similarity_assessment(r#"{"risk_level": "LOW"}"#, &names).expect("parse");
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert_eq!(assessment.conflicting_names, names);
    }
}
