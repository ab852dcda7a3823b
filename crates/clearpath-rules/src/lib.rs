//! Clearpath Rules - Deterministic per-jurisdiction naming rules.
//!
//! Rule books are TOML files listing case-insensitive patterns in
//! declaration order. The built-in books are embedded in the crate; extra
//! or replacement books can be loaded from a directory.
//!
//! # Example
//!
//! ```rust
//! use clearpath_core::EntityType;
//! use clearpath_rules::RuleEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = RuleEngine::builtin()?;
//! let flags = engine.apply_rules("Acme Bank Inc", EntityType::Llc, "DE");
//! assert_eq!(flags.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod engine;
pub mod error;
pub mod rule;

pub use engine::{RuleEngine, NO_RULES_SUMMARY};
pub use error::{Result, RuleError};
pub use rule::{NamingFlag, NamingRule, RuleBook, Severity};
