//! Clearpath LLM - Text interpretation backed by a language model.
//!
//! This crate provides a provider abstraction for completions plus the two
//! interpretation operations the search engine delegates to a model:
//! reading an ambiguous results page and assessing deceptive-similarity risk.
//!
//! Both operations are infallible from the caller's side. Network failures and
//! malformed model output collapse into fixed degraded values.
//!
//! # Example
//!
//! ```rust,no_run
//! use clearpath_core::EntityType;
//! use clearpath_llm::{AnthropicProvider, LlmInterpreter, PageQuery, TextInterpreter};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(AnthropicProvider::new("sk-...")?);
//! let interpreter = LlmInterpreter::new(provider);
//!
//! let reading = interpreter
//!     .interpret_ambiguous_page(&PageQuery {
//!         jurisdiction: "Delaware".to_string(),
//!         searched_name: "Acme Ventures".to_string(),
//!         entity_type: EntityType::Llc,
//!         page_excerpt: "Search returned 2 records ...".to_string(),
//!     })
//!     .await;
//! println!("{}: {}", reading.availability, reading.notes);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod interpreter;
pub mod prompts;
pub mod provider;
pub mod providers;

// Re-export commonly used types
pub use error::{LlmError, Result};
pub use interpreter::{LlmInterpreter, PageQuery, SimilarityQuery, TextInterpreter};
pub use provider::{CompletionRequest, CompletionResponse, LlmProvider, Usage};
pub use providers::AnthropicProvider;
