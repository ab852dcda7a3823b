//! Source definition types loaded from TOML.
//!
//! A definition names a registry, says how to reach it and carries the
//! volatile per-site heuristics (selectors, negative phrases, status
//! vocabularies) the shared cascade executor consumes.

use crate::error::{Result, SourceError};
use clearpath_core::{SourceDescriptor, SourceId, SourceKind, DEFAULT_SOURCE_WEIGHT};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete source definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Source metadata
    pub source: SourceMetadata,

    /// How the source is reached
    pub access: AccessMethod,

    /// Extraction heuristics
    #[serde(default)]
    pub cascade: CascadeProfile,
}

impl SourceDefinition {
    /// Get the source ID.
    #[must_use]
    pub fn id(&self) -> &SourceId {
        &self.source.id
    }

    /// Get the source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Identity carried into every result from this source.
    #[must_use]
    pub fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            id: self.source.id.clone(),
            name: self.source.name.clone(),
            jurisdiction: self
                .source
                .jurisdiction
                .clone()
                .unwrap_or_else(|| self.source.id.to_string()),
            kind: self.access.kind(),
            source_weight: self.source.source_weight,
        }
    }

    /// Validate the definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| SourceError::Definition {
            source_id: self.source.id.to_string(),
            reason: reason.to_string(),
        };

        if self.source.name.trim().is_empty() {
            return Err(invalid("source name cannot be empty"));
        }

        let weight = self.source.source_weight;
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(invalid(&format!(
                "source_weight must be in (0, 1], got {weight}"
            )));
        }

        self.access.validate(&self.source.id)?;

        if self.access.scrapes_pages() {
            let Some(primary) = &self.cascade.primary else {
                return Err(invalid("page-scraping sources need a primary table strategy"));
            };
            primary.validate(&self.source.id)?;
        }
        if let Some(fallback) = &self.cascade.fallback {
            fallback.validate(&self.source.id)?;
        }

        Ok(())
    }
}

fn default_weight() -> f64 {
    DEFAULT_SOURCE_WEIGHT
}

fn default_request_timeout() -> u64 {
    20
}

/// Core source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Unique source identifier (e.g., "DE", "NY")
    pub id: SourceId,

    /// Human-readable source name
    pub name: String,

    /// Jurisdiction used for naming rules; defaults to the ID
    #[serde(default)]
    pub jurisdiction: Option<String>,

    /// Baseline trust in the access method
    #[serde(default = "default_weight")]
    pub source_weight: f64,
}

/// Structured API flavours the API adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiDialect {
    /// Socrata open-data query API (`$where`, `$limit`, `$order`)
    Soda,
    /// Subscription-key keyword search returning loosely shaped JSON
    Calico,
}

/// Methods for reaching a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum AccessMethod {
    /// Direct structured query
    Api {
        /// Endpoint URL
        endpoint: String,
        /// Query/response dialect
        dialect: ApiDialect,
        /// Prefix used in user-facing notes (e.g. "CA SOS API")
        #[serde(default)]
        label: Option<String>,
        /// Credential name required by the endpoint
        #[serde(default)]
        credential: Option<String>,
        /// Per-request timeout
        #[serde(default = "default_request_timeout")]
        timeout_secs: u64,
    },

    /// Form page fetched for a session, then submitted over HTTP
    SessionForm {
        /// Page holding the search form
        form_url: String,
        /// Input name that receives the searched name
        query_field: String,
        /// Submission URL when it differs from the form's action
        #[serde(default)]
        submit_url: Option<String>,
        /// Additional fixed form fields
        #[serde(default)]
        extra_fields: BTreeMap<String, String>,
        /// Per-request timeout
        #[serde(default = "default_request_timeout")]
        timeout_secs: u64,
    },

    /// Client-rendered application driven through a headless browser
    Rendered {
        /// Search page URL
        url: String,
        /// Candidate selectors for the name input, tried in order
        input_selectors: Vec<String>,
        /// Candidate selectors for the submit control, tried in order
        submit_selectors: Vec<String>,
    },

    /// No reliable programmatic path
    Manual {
        /// URL to start a manual search
        url: String,
        /// Why the search is manual
        #[serde(default)]
        instructions: Option<String>,
    },
}

impl AccessMethod {
    /// Access family reported on results.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Api { .. } => SourceKind::Api,
            _ => SourceKind::Form,
        }
    }

    /// Whether results come from an HTML page run through the table cascade.
    #[must_use]
    pub fn scrapes_pages(&self) -> bool {
        matches!(self, Self::SessionForm { .. } | Self::Rendered { .. })
    }

    fn validate(&self, source_id: &SourceId) -> Result<()> {
        let invalid = |reason: &str| SourceError::Definition {
            source_id: source_id.to_string(),
            reason: reason.to_string(),
        };
        let check_url = |url: &str, what: &str| -> Result<()> {
            if url.trim().is_empty() {
                return Err(invalid(&format!("{what} cannot be empty")));
            }
            url::Url::parse(url).map_err(|e| invalid(&format!("{what} is not a valid URL: {e}")))?;
            Ok(())
        };

        match self {
            Self::Api { endpoint, .. } => check_url(endpoint, "API endpoint")?,
            Self::SessionForm {
                form_url,
                query_field,
                submit_url,
                ..
            } => {
                check_url(form_url, "form URL")?;
                if let Some(submit_url) = submit_url {
                    check_url(submit_url, "submit URL")?;
                }
                if query_field.trim().is_empty() {
                    return Err(invalid("query_field cannot be empty"));
                }
            }
            Self::Rendered {
                url,
                input_selectors,
                submit_selectors,
            } => {
                check_url(url, "search URL")?;
                if input_selectors.is_empty() {
                    return Err(invalid("rendered sources need at least one input selector"));
                }
                if submit_selectors.is_empty() {
                    return Err(invalid("rendered sources need at least one submit selector"));
                }
            }
            Self::Manual { url, .. } => check_url(url, "manual search URL")?,
        }
        Ok(())
    }
}

/// What to conclude when no rows were extracted and no negative phrase matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerPolicy {
    /// Treat as a definitive "no results"
    Available,
    /// Hand the page text to the interpretation capability
    #[default]
    Escalate,
}

fn default_true() -> bool {
    true
}

/// Per-source heuristics consumed by the cascade executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeProfile {
    /// Phrases that signal an explicit "no results" page (case-insensitive)
    #[serde(default)]
    pub negative_phrases: Vec<String>,

    /// Deterministic table parse
    #[serde(default)]
    pub primary: Option<TableStrategy>,

    /// Independent second strategy
    #[serde(default)]
    pub fallback: Option<TableStrategy>,

    /// Outcome when no result container exists at all
    #[serde(default)]
    pub on_missing_container: ContainerPolicy,

    /// Outcome when a container exists but holds no rows
    #[serde(default)]
    pub on_empty_container: ContainerPolicy,

    /// Statuses (lowercase) meaning the entity is no longer active
    #[serde(default)]
    pub inactive_statuses: Vec<String>,

    /// Whether unparseable pages go to the interpretation capability
    #[serde(default = "default_true")]
    pub llm_escalation: bool,
}

impl Default for CascadeProfile {
    fn default() -> Self {
        Self {
            negative_phrases: Vec::new(),
            primary: None,
            fallback: None,
            on_missing_container: ContainerPolicy::default(),
            on_empty_container: ContainerPolicy::default(),
            inactive_statuses: Vec::new(),
            llm_escalation: true,
        }
    }
}

fn default_rows() -> String {
    "tr".to_string()
}

fn default_cells() -> String {
    "td".to_string()
}

fn default_header_cells() -> String {
    "th, td".to_string()
}

fn default_min_cells() -> usize {
    1
}

/// Table extraction strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStrategy {
    /// Candidate container selectors, tried in order
    pub containers: Vec<String>,

    /// Row selector within a container
    #[serde(default = "default_rows")]
    pub rows: String,

    /// Data cell selector within a row
    #[serde(default = "default_cells")]
    pub cells: String,

    /// Header cell selector, used by header-inferred layouts
    #[serde(default = "default_header_cells")]
    pub header_cells: String,

    /// How cells map to match fields
    pub layout: ColumnLayout,

    /// Rows with fewer data cells are skipped
    #[serde(default = "default_min_cells")]
    pub min_cells: usize,

    /// Cell texts (any column) that mark a header row to skip
    #[serde(default)]
    pub header_labels: Vec<String>,
}

impl TableStrategy {
    fn validate(&self, source_id: &SourceId) -> Result<()> {
        let invalid = |reason: String| SourceError::Definition {
            source_id: source_id.to_string(),
            reason,
        };

        if self.containers.is_empty() {
            return Err(invalid("table strategy needs at least one container".to_string()));
        }
        for selector in self
            .containers
            .iter()
            .chain([&self.rows, &self.cells, &self.header_cells])
        {
            Selector::parse(selector)
                .map_err(|e| invalid(format!("invalid selector '{selector}': {e}")))?;
        }
        Ok(())
    }
}

/// Column mapping for a results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnLayout {
    /// Known column positions
    Fixed {
        /// Entity name column
        name: usize,
        /// File/document number column
        #[serde(default)]
        file_number: Option<usize>,
        /// Status column
        #[serde(default)]
        status: Option<usize>,
        /// Entity type column
        #[serde(default)]
        entity_type: Option<usize>,
        /// Registration date column
        #[serde(default)]
        registered: Option<usize>,
    },
    /// Positions inferred from the first row's header text
    Header,
}
