//! Browser automation for JavaScript-rendered registry sites.
//!
//! Provides a headless Chromium engine, a [`PageActions`] trait that source
//! adapters drive, and a bounded [`BrowserPool`] so only a fixed number of
//! engine instances run at once.

#![warn(missing_docs)]

/// Page-level action trait
pub mod actions;
/// Chromium engine lifecycle
pub mod engine;
/// Error types
pub mod error;
/// Browser identity selection
pub mod fingerprint;
/// Chromium tab
pub mod page;
/// Bounded engine pool
pub mod pool;

pub use actions::{first_present, PageActions};
pub use engine::{BrowserEngine, BrowserOptions};
pub use error::{BrowserError, Result};
pub use page::BrowserPage;
pub use pool::{BrowserLease, BrowserPool, PoolSlot};
