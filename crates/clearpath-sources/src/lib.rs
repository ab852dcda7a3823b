//! Clearpath Sources - external registries and how to read them.
//!
//! Each registry is described by a TOML [`SourceDefinition`]: how it is
//! reached (structured API, session form, rendered application, or manual)
//! and the volatile heuristics the shared [`CascadeExecutor`] applies to its
//! pages. The [`SourceRegistry`] builds one [`SourceAdapter`] per definition
//! from an injected [`SourceContext`].
//!
//! # Example
//!
//! ```rust,no_run
//! use clearpath_core::EntityType;
//! use clearpath_sources::{SourceContext, SourceLoader, SourceRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let definitions = SourceLoader::builtin()?;
//! let ctx = SourceContext::new(reqwest::Client::new());
//! let registry = SourceRegistry::from_definitions(&definitions, &ctx)?;
//!
//! for id in registry.ids() {
//!     let result = registry.get(&id)?.search("Acme Ventures", EntityType::Llc).await;
//!     println!("{id}: {}", result.availability);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod adapter;
pub mod api;
pub mod cascade;
pub mod definition;
pub mod detail;
pub mod error;
pub mod html;
pub mod loader;
pub mod manual;
pub mod registry;
pub mod rendered;
pub mod session_form;
pub mod trademark;

pub use adapter::{Credentials, RenderTimings, SourceAdapter, SourceContext, DEFAULT_BUDGET};
pub use cascade::{CascadeExecutor, PageCapture, DEFAULT_EXCERPT_CHARS};
pub use definition::{
    AccessMethod, ApiDialect, CascadeProfile, ColumnLayout, ContainerPolicy, SourceDefinition,
    SourceMetadata, TableStrategy,
};
pub use detail::{EntityDetailFetcher, OpenCorporatesFetcher};
pub use error::{Result, SourceError};
pub use loader::SourceLoader;
pub use registry::SourceRegistry;
pub use trademark::{TrademarkCheck, UsptoManualCheck, TRADEMARK_SEARCH_URL};
