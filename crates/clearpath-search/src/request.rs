//! Search submission and its validation.

use crate::error::{Result, SearchError};
use clearpath_core::{EntityType, SourceId};
use clearpath_sources::SourceRegistry;
use tracing::warn;

/// A name search as submitted by a caller.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Business name to check
    pub name: String,
    /// Entity type label (e.g. `LLC`)
    pub entity_type: String,
    /// Source codes to query; empty means the defaults
    pub sources: Vec<String>,
}

impl SearchRequest {
    /// Request against the default sources.
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            sources: Vec::new(),
        }
    }

    /// Restrict the request to the given source codes.
    #[must_use]
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Trimmed name
    pub name: String,
    /// Parsed entity type
    pub entity_type: EntityType,
    /// Registered sources in request order, without duplicates
    pub sources: Vec<SourceId>,
}

/// Validate a request against the registry.
///
/// Explicitly requested sources must all be registered. Defaults that are
/// not registered are skipped with a warning.
pub fn validate_request(
    request: &SearchRequest,
    registry: &SourceRegistry,
    default_sources: &[String],
) -> Result<ValidatedRequest> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(SearchError::InvalidRequest {
            reason: "name cannot be empty".to_string(),
        });
    }

    let entity_type = request
        .entity_type
        .parse::<EntityType>()
        .map_err(|_| SearchError::InvalidRequest {
            reason: format!(
                "entity type must be one of: {}",
                EntityType::ALL.map(|t| t.as_str()).join(", ")
            ),
        })?;

    let explicit = !request.sources.is_empty();
    let requested = if explicit {
        request.sources.as_slice()
    } else {
        default_sources
    };

    let mut sources: Vec<SourceId> = Vec::with_capacity(requested.len());
    for code in requested {
        let id = SourceId::parse_lenient(code).map_err(|_| SearchError::UnknownSource {
            source_id: code.clone(),
        })?;
        if !registry.contains(&id) {
            if explicit {
                return Err(SearchError::UnknownSource {
                    source_id: id.to_string(),
                });
            }
            warn!(source_id = %id, "default source is not registered, skipping");
            continue;
        }
        if !sources.contains(&id) {
            sources.push(id);
        }
    }

    if sources.is_empty() {
        return Err(SearchError::InvalidRequest {
            reason: format!(
                "no supported sources requested. Supported: {}",
                registry
                    .ids()
                    .iter()
                    .map(SourceId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        });
    }

    Ok(ValidatedRequest {
        name: name.to_string(),
        entity_type,
        sources,
    })
}
