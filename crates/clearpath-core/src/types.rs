//! Shared types used across the Clearpath engine.
//!
//! This module defines the identifiers, verdict enums and result records
//! that flow between source adapters, the orchestrator and the store.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Newtype for source identifiers with validation.
///
/// Source IDs are short uppercase codes such as `DE`, `NY` or `USPTO`:
/// 2-16 characters of `A-Z`, `0-9` and `_`, starting with a letter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Create a new `SourceId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Parse a user-supplied code, uppercasing it first.
    pub fn parse_lenient(id: &str) -> Result<Self, CoreError> {
        Self::new(id.trim().to_uppercase())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), CoreError> {
        static SOURCE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SOURCE_REGEX
            .get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]{1,15}$").expect("valid regex"));

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid source ID: must be 2-16 uppercase alphanumeric characters, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SourceId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

/// Newtype for job identifiers (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Create a `JobId` from an existing string, validating it as a UUID.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        uuid::Uuid::parse_str(&id)
            .map_err(|e| CoreError::Validation(format!("invalid job ID '{id}': {e}")))?;
        Ok(Self(id))
    }

    /// Create a new random `JobId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Legal entity types a name can be searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Limited liability company
    #[serde(rename = "LLC")]
    Llc,
    /// Corporation
    #[serde(rename = "Corporation")]
    Corporation,
    /// Limited partnership
    #[serde(rename = "LP")]
    Lp,
    /// Limited liability partnership
    #[serde(rename = "LLP")]
    Llp,
    /// Professional corporation
    #[serde(rename = "PC")]
    Pc,
    /// Professional limited liability company
    #[serde(rename = "PLLC")]
    Pllc,
}

impl EntityType {
    /// All supported entity types in display order.
    pub const ALL: [Self; 6] = [
        Self::Llc,
        Self::Corporation,
        Self::Lp,
        Self::Llp,
        Self::Pc,
        Self::Pllc,
    ];

    /// Canonical display form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llc => "LLC",
            Self::Corporation => "Corporation",
            Self::Lp => "LP",
            Self::Llp => "LLP",
            Self::Pc => "PC",
            Self::Pllc => "PLLC",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::Parse {
                kind: "entity type",
                value: s.to_string(),
            })
    }
}

/// Implements `as_str`, `Display` and `FromStr` for a lowercase label enum.
macro_rules! label_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            /// Lowercase wire label.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(CoreError::Parse {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// Availability verdict for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// No record found
    Available,
    /// An exact match exists
    Taken,
    /// Only non-exact matches exist
    Similar,
    /// The source could not give a verdict
    Unknown,
    /// The lookup failed
    Error,
}

label_enum!(Availability, "availability", {
    Available => "available",
    Taken => "taken",
    Similar => "similar",
    Unknown => "unknown",
    Error => "error",
});

/// Which extraction strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionTier {
    /// Deterministic structured parse
    Primary,
    /// Independent second strategy
    Fallback,
    /// Text interpretation capability
    Llm,
    /// Extraction did not happen
    Failed,
}

label_enum!(ExtractionTier, "extraction tier", {
    Primary => "primary",
    Fallback => "fallback",
    Llm => "llm",
    Failed => "failed",
});

/// How unambiguous the extracted signal was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clarity {
    /// Definitive structural classification
    Clear,
    /// Non-empty similar set; never provably exhaustive
    Inferred,
    /// Interpreted from unstructured text
    Ambiguous,
}

label_enum!(Clarity, "clarity", {
    Clear => "clear",
    Inferred => "inferred",
    Ambiguous => "ambiguous",
});

/// Access method family as reported on results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Direct structured API
    Api,
    /// Web form, scraped or browser-driven
    Form,
}

label_enum!(SourceKind, "source kind", {
    Api => "api",
    Form => "form",
});

/// Deceptive-similarity risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Unlikely to be confused
    Low,
    /// Some risk of confusion
    Medium,
    /// High risk of confusion
    High,
    /// Risk could not be assessed
    Unknown,
}

label_enum!(RiskLevel, "risk level", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Unknown => "unknown",
});

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, not yet started
    Pending,
    /// Fan-out in progress
    Running,
    /// All tasks settled
    Complete,
    /// Orchestration-level fault
    Error,
}

label_enum!(JobStatus, "job status", {
    Pending => "pending",
    Running => "running",
    Complete => "complete",
    Error => "error",
});

impl JobStatus {
    /// Whether the job has reached a final state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// One record found on a source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityMatch {
    /// Registered entity name
    pub name: String,
    /// Entity type as reported by the source
    pub entity_type: String,
    /// Status as reported by the source (e.g. active, dissolved)
    pub status: String,
    /// Source-specific file/document number
    pub file_number: String,
    /// Registration date if available
    pub registered_date: String,
}

impl EntityMatch {
    /// Match with only a name and an unknown status.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "unknown".to_string(),
            ..Self::default()
        }
    }

    /// Replace the status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Replace the file number.
    #[must_use]
    pub fn with_file_number(mut self, file_number: impl Into<String>) -> Self {
        self.file_number = file_number.into();
        self
    }
}

/// Identity of a source carried into every result it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Source code
    pub id: SourceId,
    /// Human-readable name
    pub name: String,
    /// Jurisdiction used for naming rules (e.g. `DE`, `US`)
    pub jurisdiction: String,
    /// Access method family
    pub kind: SourceKind,
    /// Baseline trust in the access method
    pub source_weight: f64,
}

/// Normalized verdict for one (job, source) pair.
///
/// Results are never mutated after they leave an adapter; builder methods
/// consume `self` and return the corrected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    /// Source code
    pub source_id: SourceId,
    /// Human-readable source name
    pub source_name: String,
    /// Availability verdict
    pub availability: Availability,
    /// Confidence in `[0, 1]`, two decimals
    pub confidence: f64,
    /// Matches extracted from the source
    pub raw_matches: Vec<EntityMatch>,
    /// Non-exact match names
    pub similar_names: Vec<String>,
    /// Naming-rule and similarity flags
    pub flags: Vec<String>,
    /// Human-readable notes
    pub notes: String,
    /// Strategy that produced the matches
    pub extraction_tier: ExtractionTier,
    /// Access method family
    pub source_kind: SourceKind,
    /// When the lookup finished
    pub checked_at: Timestamp,
}

impl SourceResult {
    /// Failed lookup: `availability=error`, fixed confidence 0.1.
    #[must_use]
    pub fn error(descriptor: &SourceDescriptor, notes: impl Into<String>) -> Self {
        Self::bare(descriptor, Availability::Error, 0.1, notes.into())
    }

    /// Source without a programmatic path: `availability=unknown`, confidence 0.0.
    #[must_use]
    pub fn manual(descriptor: &SourceDescriptor, notes: impl Into<String>) -> Self {
        Self::bare(descriptor, Availability::Unknown, 0.0, notes.into())
    }

    /// Result built from classified matches.
    #[must_use]
    pub fn from_classification(
        descriptor: &SourceDescriptor,
        classification: crate::classify::Classification,
        tier: ExtractionTier,
    ) -> Self {
        let confidence = crate::confidence::compute_confidence(
            tier,
            descriptor.source_weight,
            classification.clarity,
        );
        Self {
            source_id: descriptor.id.clone(),
            source_name: descriptor.name.clone(),
            availability: classification.availability,
            confidence,
            raw_matches: classification.matches,
            similar_names: classification.similar_names,
            flags: Vec::new(),
            notes: classification.notes,
            extraction_tier: tier,
            source_kind: descriptor.kind,
            checked_at: Timestamp::now(),
        }
    }

    /// Result adopted verbatim from the interpretation capability.
    #[must_use]
    pub fn from_interpretation(
        descriptor: &SourceDescriptor,
        interpretation: PageInterpretation,
    ) -> Self {
        let confidence = crate::confidence::compute_confidence(
            ExtractionTier::Llm,
            descriptor.source_weight,
            interpretation.clarity,
        );
        Self {
            source_id: descriptor.id.clone(),
            source_name: descriptor.name.clone(),
            availability: interpretation.availability,
            confidence,
            raw_matches: Vec::new(),
            similar_names: interpretation.similar_names,
            flags: Vec::new(),
            notes: interpretation.notes,
            extraction_tier: ExtractionTier::Llm,
            source_kind: descriptor.kind,
            checked_at: Timestamp::now(),
        }
    }

    /// Append flags, returning the new value.
    #[must_use]
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = String>) -> Self {
        self.flags.extend(flags);
        self
    }

    fn bare(
        descriptor: &SourceDescriptor,
        availability: Availability,
        confidence: f64,
        notes: String,
    ) -> Self {
        Self {
            source_id: descriptor.id.clone(),
            source_name: descriptor.name.clone(),
            availability,
            confidence,
            raw_matches: Vec::new(),
            similar_names: Vec::new(),
            flags: Vec::new(),
            notes,
            extraction_tier: ExtractionTier::Failed,
            source_kind: descriptor.kind,
            checked_at: Timestamp::now(),
        }
    }
}

/// Output of the ambiguous-page interpretation operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInterpretation {
    /// Interpreted verdict
    pub availability: Availability,
    /// Names the model considered similar
    pub similar_names: Vec<String>,
    /// Model-reported clarity
    pub clarity: Clarity,
    /// Model explanation
    pub notes: String,
}

impl PageInterpretation {
    /// Fixed default used when the model output cannot be used.
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            availability: Availability::Unknown,
            similar_names: Vec::new(),
            clarity: Clarity::Ambiguous,
            notes: "LLM response could not be parsed.".to_string(),
        }
    }
}

/// Deceptive-similarity assessment folded into a result's flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityAssessment {
    /// Assessed risk
    pub risk_level: RiskLevel,
    /// Names judged to conflict
    pub conflicting_names: Vec<String>,
    /// Short explanation
    pub explanation: String,
    /// Recommended next step
    pub recommendation: String,
}

impl SimilarityAssessment {
    /// Fixed default used when the assessment could not be obtained.
    #[must_use]
    pub fn degraded(similar_names: &[String]) -> Self {
        Self {
            risk_level: RiskLevel::Unknown,
            conflicting_names: similar_names.to_vec(),
            explanation: "Could not parse similarity analysis.".to_string(),
            recommendation: "Review similar names manually.".to_string(),
        }
    }

    /// Format as a single result flag.
    #[must_use]
    pub fn to_flag(&self) -> String {
        format!(
            "[SIMILARITY] Risk: {}. {} {}",
            self.risk_level.as_str().to_uppercase(),
            self.explanation,
            self.recommendation
        )
    }
}

/// Trademark-office check for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrademarkResult {
    /// Marks identical to the searched name
    pub exact_matches: Vec<String>,
    /// Marks similar to the searched name
    pub similar_marks: Vec<String>,
    /// Overall risk
    pub risk_level: RiskLevel,
    /// Human-readable notes
    pub notes: String,
    /// When the check finished
    pub checked_at: Timestamp,
}

/// Job aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Job ID
    pub id: JobId,
    /// Name as submitted (trimmed)
    pub searched_name: String,
    /// Entity type searched for
    pub entity_type: EntityType,
    /// Sources the job fans out to
    pub requested_sources: Vec<SourceId>,
    /// Lifecycle status
    pub status: JobStatus,
    /// Creation time
    pub created_at: Timestamp,
    /// Time a terminal status was reached
    pub completed_at: Option<Timestamp>,
}

impl Job {
    /// New pending job with a fresh ID.
    #[must_use]
    pub fn new(
        searched_name: impl Into<String>,
        entity_type: EntityType,
        requested_sources: Vec<SourceId>,
    ) -> Self {
        Self {
            id: JobId::generate(),
            searched_name: searched_name.into(),
            entity_type,
            requested_sources,
            status: JobStatus::Pending,
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }
}

/// A job with everything appended to it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// The job record
    pub job: Job,
    /// Results in append order
    pub results: Vec<SourceResult>,
    /// Trademark-office result, once available
    pub trademark: Option<TrademarkResult>,
}

/// Registry detail for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetail {
    /// Source the file number belongs to
    pub source_id: SourceId,
    /// Source-specific file number
    pub file_number: String,
    /// Registered name
    pub entity_name: Option<String>,
    /// Entity kind as reported by the registry
    pub entity_kind: Option<String>,
    /// Formation/incorporation date
    pub formation_date: Option<String>,
    /// Registered agent name
    pub registered_agent: Option<String>,
    /// Public page for the entity
    pub reference_url: String,
}

/// Outcome of a detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetailOutcome {
    /// Detail retrieved
    Found(EntityDetail),
    /// Detail could not be retrieved
    Failed {
        /// Human-readable error
        error: String,
        /// Public page the user can check instead
        reference_url: String,
    },
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, CoreError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| CoreError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> SourceDescriptor {
        SourceDescriptor {
            id: SourceId::new("DE").expect("valid source ID"),
            name: "Delaware".to_string(),
            jurisdiction: "DE".to_string(),
            kind: SourceKind::Form,
            source_weight: 0.85,
        }
    }

    #[test]
    fn test_source_id_valid() {
        for id in ["DE", "NY", "USPTO", "CA_SOS"] {
            assert!(SourceId::new(id).is_ok(), "Failed for: {id}");
        }
    }

    #[test]
    fn test_source_id_invalid() {
        for id in ["", "D", "de", "1A", "D E", "ABCDEFGHIJKLMNOPQ"] {
            assert!(SourceId::new(id).is_err(), "Should fail for: {id}");
        }
    }

    #[test]
    fn test_source_id_lenient() {
        let id = SourceId::parse_lenient(" fl ").expect("lenient parse");
        assert_eq!(id.as_str(), "FL");
    }

    #[test]
    fn test_source_id_deserialize_validates() {
        let ok: SourceId = serde_json::from_str("\"NJ\"").expect("deserialize source ID");
        assert_eq!(ok.as_str(), "NJ");
        assert!(serde_json::from_str::<SourceId>("\"nj\"").is_err());
    }

    #[test]
    fn test_job_id() {
        let id = JobId::generate();
        assert!(JobId::new(id.as_str()).is_ok());
        assert!(JobId::new("not-a-uuid").is_err());
    }

    #[test]
    fn test_entity_type_parse() {
        assert_eq!("llc".parse::<EntityType>().expect("parse"), EntityType::Llc);
        assert_eq!(
            " corporation ".parse::<EntityType>().expect("parse"),
            EntityType::Corporation
        );
        assert!("Trust".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_entity_type_serialization() {
        let json = serde_json::to_string(&EntityType::Pllc).expect("serialize");
        assert_eq!(json, "\"PLLC\"");
    }

    #[test]
    fn test_label_enums() {
        assert_eq!(Availability::Similar.to_string(), "similar");
        assert_eq!(
            "PRIMARY".parse::<ExtractionTier>().expect("parse tier"),
            ExtractionTier::Primary
        );
        assert!("maybe".parse::<Clarity>().is_err());
        assert!(JobStatus::Complete.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_error_result() {
        let result = SourceResult::error(&descriptor(), "timed out");
        assert_eq!(result.availability, Availability::Error);
        assert!((result.confidence - 0.1).abs() < f64::EPSILON);
        assert_eq!(result.extraction_tier, ExtractionTier::Failed);
        assert_eq!(result.source_kind, SourceKind::Form);
    }

    #[test]
    fn test_manual_result() {
        let result = SourceResult::manual(&descriptor(), "search manually");
        assert_eq!(result.availability, Availability::Unknown);
        assert!(result.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_flags_appends() {
        let result = SourceResult::error(&descriptor(), "x")
            .with_flags(vec!["[INFO] a".to_string()])
            .with_flags(vec!["[WARNING] b".to_string()]);
        assert_eq!(result.flags, vec!["[INFO] a", "[WARNING] b"]);
    }

    #[test]
    fn test_interpretation_result() {
        let interpretation = PageInterpretation {
            availability: Availability::Similar,
            similar_names: vec!["ACME HOLDINGS".to_string()],
            clarity: Clarity::Inferred,
            notes: "one near match".to_string(),
        };
        let result = SourceResult::from_interpretation(&descriptor(), interpretation);
        assert_eq!(result.extraction_tier, ExtractionTier::Llm);
        assert_eq!(result.availability, Availability::Similar);
        // 0.4*0.4 + 0.85*0.25 + 0.7*0.25 + 0.1
        assert!((result.confidence - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_flag_format() {
        let assessment = SimilarityAssessment {
            risk_level: RiskLevel::High,
            conflicting_names: vec!["ACME VENTURE".to_string()],
            explanation: "Differs by one letter.".to_string(),
            recommendation: "Choose another name.".to_string(),
        };
        assert_eq!(
            assessment.to_flag(),
            "[SIMILARITY] Risk: HIGH. Differs by one letter. Choose another name."
        );
    }

    #[test]
    fn test_degraded_defaults() {
        let names = vec!["A".to_string(), "B".to_string()];
        let degraded = SimilarityAssessment::degraded(&names);
        assert_eq!(degraded.risk_level, RiskLevel::Unknown);
        assert_eq!(degraded.conflicting_names, names);

        let page = PageInterpretation::degraded();
        assert_eq!(page.availability, Availability::Unknown);
        assert_eq!(page.clarity, Clarity::Ambiguous);
    }

    #[test]
    fn test_detail_outcome_serialization() {
        let outcome = DetailOutcome::Failed {
            error: "not found".to_string(),
            reference_url: "https://example.test".to_string(),
        };
        let json = serde_json::to_string(&outcome).expect("serialize outcome");
        assert!(json.contains("\"outcome\":\"failed\""));
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::now();
        let parsed = Timestamp::from_rfc3339(&ts.to_rfc3339()).expect("parse RFC3339 timestamp");
        assert_eq!(ts.as_datetime().timestamp(), parsed.as_datetime().timestamp());
    }
}
