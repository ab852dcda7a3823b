//! Sources with no reliable programmatic path.

use crate::adapter::SourceAdapter;
use crate::definition::{AccessMethod, SourceDefinition};
use crate::error::{Result, SourceError};
use async_trait::async_trait;
use clearpath_core::{EntityType, SourceDescriptor, SourceResult};

/// Always answers `unknown` with directions for a manual search.
pub struct ManualAdapter {
    descriptor: SourceDescriptor,
    url: String,
    instructions: Option<String>,
}

impl ManualAdapter {
    /// Build from a definition whose access method is `manual`.
    pub fn from_definition(definition: &SourceDefinition) -> Result<Self> {
        let AccessMethod::Manual { url, instructions } = &definition.access else {
            return Err(SourceError::Definition {
                source_id: definition.id().to_string(),
                reason: "not a manual source".to_string(),
            });
        };
        Ok(Self {
            descriptor: definition.descriptor(),
            url: url.clone(),
            instructions: instructions.clone(),
        })
    }
}

#[async_trait]
impl SourceAdapter for ManualAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn lookup(&self, name: &str, _entity_type: EntityType) -> Result<SourceResult> {
        let reason = self.instructions.as_deref().map_or_else(
            || format!("Automated {} search is unavailable.", self.descriptor.name),
            str::to_string,
        );
        Ok(SourceResult::manual(
            &self.descriptor,
            format!(
                "{reason} Search manually at {} using the name: \"{}\".",
                self.url,
                name.trim()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearpath_core::{Availability, ExtractionTier, SourceKind};

    #[tokio::test]
    async fn test_manual_result() {
        let def: SourceDefinition = toml::from_str(
            r##"
[source]
id = "WA"
name = "Washington"

[access]
method = "manual"
url = "https://ccfs.sos.wa.gov/#/AdvancedSearch"
"##,
        )
        .expect("definition");
        let adapter = ManualAdapter::from_definition(&def).expect("adapter");
        let result = adapter.search("Acme Ventures", EntityType::Llc).await;

        assert_eq!(result.availability, Availability::Unknown);
        assert_eq!(result.extraction_tier, ExtractionTier::Failed);
        assert_eq!(result.source_kind, SourceKind::Form);
        assert!(result.confidence.abs() < f64::EPSILON);
        assert!(result.notes.contains("https://ccfs.sos.wa.gov/#/AdvancedSearch"));
        assert!(result.notes.contains("\"Acme Ventures\""));
    }
}
