//! Error types for rule book loading.

use thiserror::Error;

/// Errors that can occur while loading rule books.
#[derive(Error, Debug)]
pub enum RuleError {
    /// Rule book TOML could not be parsed
    #[error("failed to parse rule book {origin}: {source}")]
    Parse {
        /// File path or embedded book name
        origin: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// A rule pattern is not a valid regex
    #[error("invalid pattern '{pattern}' in {jurisdiction} rules: {source}")]
    InvalidPattern {
        /// Jurisdiction code
        jurisdiction: String,
        /// Offending pattern
        pattern: String,
        /// Regex error
        #[source]
        source: regex::Error,
    },

    /// I/O error while reading rule books
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
