//! Source registry mapping IDs to adapters.

use crate::{
    adapter::{SourceAdapter, SourceContext},
    api::ApiAdapter,
    definition::{AccessMethod, SourceDefinition},
    error::{Result, SourceError},
    manual::ManualAdapter,
    rendered::RenderedAdapter,
    session_form::SessionFormAdapter,
};
use clearpath_core::{SourceDescriptor, SourceId};
use std::sync::Arc;
use tracing::{debug, info};

/// Adapters in registration order.
///
/// New sources are added through [`register`](Self::register) without any
/// change to the orchestrator.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: Vec<(SourceId, Arc<dyn SourceAdapter>)>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one adapter per definition, choosing the implementation by access method.
    ///
    /// # Errors
    /// Returns error if a definition is invalid or an ID is registered twice.
    pub fn from_definitions(definitions: &[SourceDefinition], ctx: &SourceContext) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            definition.validate()?;
            let adapter: Arc<dyn SourceAdapter> = match &definition.access {
                AccessMethod::Api { .. } => Arc::new(ApiAdapter::from_definition(definition, ctx)?),
                AccessMethod::SessionForm { .. } => {
                    Arc::new(SessionFormAdapter::from_definition(definition, ctx)?)
                }
                AccessMethod::Rendered { .. } => {
                    Arc::new(RenderedAdapter::from_definition(definition, ctx)?)
                }
                AccessMethod::Manual { .. } => Arc::new(ManualAdapter::from_definition(definition)?),
            };
            registry.register(adapter)?;
        }
        info!(count = registry.len(), "source registry built");
        Ok(registry)
    }

    /// Add an adapter.
    ///
    /// # Errors
    /// Returns error if the ID is already registered.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) -> Result<()> {
        let id = adapter.descriptor().id.clone();
        if self.contains(&id) {
            return Err(SourceError::Definition {
                source_id: id.to_string(),
                reason: "source already registered".to_string(),
            });
        }
        debug!(source_id = %id, "registered source adapter");
        self.adapters.push((id, adapter));
        Ok(())
    }

    /// Get an adapter by ID.
    ///
    /// # Errors
    /// Returns error if the source is not registered.
    pub fn get(&self, id: &SourceId) -> Result<Arc<dyn SourceAdapter>> {
        self.adapters
            .iter()
            .find(|(registered, _)| registered == id)
            .map(|(_, adapter)| Arc::clone(adapter))
            .ok_or_else(|| SourceError::NotFound {
                source_id: id.to_string(),
            })
    }

    /// Check if a source is registered.
    #[must_use]
    pub fn contains(&self, id: &SourceId) -> bool {
        self.adapters.iter().any(|(registered, _)| registered == id)
    }

    /// Registered IDs in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<SourceId> {
        self.adapters.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Descriptors in registration order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<SourceDescriptor> {
        self.adapters
            .iter()
            .map(|(_, adapter)| adapter.descriptor().clone())
            .collect()
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no sources are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
