//! Clearpath Search - job orchestration over every registry source.
//!
//! This crate turns a validated [`SearchRequest`] into a job, fans it out to
//! each source adapter and the trademark check concurrently, applies naming
//! rules and similarity analysis to each result, and persists results to the
//! job store as they complete.
//!
//! # Features
//!
//! - One spawned task per source, awaited jointly; a panicking task becomes an `error` row
//! - Naming rules applied to every result, similarity analysis to `similar` ones
//! - Entity-detail get-or-fetch with success-only caching
//!
//! # Example
//!
//! ```rust,ignore
//! use clearpath_search::{Orchestrator, SearchRequest};
//!
//! let orchestrator = Orchestrator::new(registry, rules, analyzer, trademark, store);
//! let snapshot = orchestrator
//!     .search(&SearchRequest::new("Acme Ventures", "LLC"))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod detail;
#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod similarity;

// Re-export commonly used types
pub use detail::DetailService;
pub use error::{Result, SearchError};
pub use orchestrator::Orchestrator;
pub use request::{validate_request, SearchRequest, ValidatedRequest};
pub use similarity::{SimilarityAnalyzer, DEFAULT_NAME_LIMIT};
