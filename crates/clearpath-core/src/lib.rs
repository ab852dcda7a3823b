//! Clearpath Core - Foundation crate for the Clearpath name availability engine.
//!
//! This crate provides the shared domain types, the match classification and
//! confidence model, error handling, and configuration management that all
//! other Clearpath crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`SourceId`, `JobId`, `EntityType`, `SourceResult`)
//! - [`classify`] - Exact/similar match classification against a searched name
//! - [`confidence`] - Weighted confidence scoring
//!
//! # Example
//!
//! ```rust
//! use clearpath_core::{classify_matches, Availability, EntityMatch};
//!
//! let matches = vec![EntityMatch::named("Acme Ventures Group")];
//! let outcome = classify_matches("Acme Ventures", matches, &[]);
//! assert_eq!(outcome.availability, Availability::Similar);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classify;
pub mod confidence;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use classify::{classify_matches, Classification, INACTIVE_ADVISORY};
pub use confidence::{clarity_weight, compute_confidence, extraction_weight, DEFAULT_SOURCE_WEIGHT};
pub use config::{
    AppConfig, BrowserConfig, DetailConfig, LlmConfig, SearchConfig, SourcesConfig, StoreConfig,
};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{
    Availability, Clarity, DetailOutcome, EntityDetail, EntityMatch, EntityType, ExtractionTier,
    Job, JobId, JobSnapshot, JobStatus, PageInterpretation, RiskLevel, SimilarityAssessment,
    SourceDescriptor, SourceId, SourceKind, SourceResult, Timestamp, TrademarkResult,
};
