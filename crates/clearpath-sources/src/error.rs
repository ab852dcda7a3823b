//! Error types for source lookups.
//!
//! Adapters return these from their fallible `lookup` step; the adapter
//! boundary converts every variant into an `error` result whose notes come
//! from [`SourceError::note`].

use thiserror::Error;

/// Errors that can occur while querying a source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A required credential is not configured
    #[error("missing credential {credential}: {message}")]
    MissingCredential {
        /// Credential name (e.g. `CA_SOS_API_KEY`)
        credential: String,
        /// User-facing explanation
        message: String,
    },

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The source answered with a non-success status
    #[error("http {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// User-facing explanation
        message: String,
    },

    /// A request exceeded its timeout
    #[error("timeout: {message}")]
    Timeout {
        /// User-facing explanation
        message: String,
    },

    /// An expected page element is missing
    #[error("structural change: {reason}")]
    StructuralChange {
        /// What could not be located
        reason: String,
    },

    /// Browser automation failed
    #[error("browser error: {0}")]
    Browser(#[from] clearpath_browser::BrowserError),

    /// Invalid source definition
    #[error("invalid source definition for {source_id}: {reason}")]
    Definition {
        /// Source ID being validated
        source_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Failed to parse a definition file
    #[error("failed to parse source definition TOML in {origin}: {source}")]
    Parse {
        /// File path or embedded name
        origin: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Response body had an unexpected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Definition directory not found
    #[error("source definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// Source not registered
    #[error("source not found: {source_id}")]
    NotFound {
        /// The source ID that was not found
        source_id: String,
    },

    /// I/O error while reading definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Human-readable text for a result's `notes`.
    #[must_use]
    pub fn note(&self) -> String {
        match self {
            Self::MissingCredential { message, .. }
            | Self::Http { message, .. }
            | Self::Timeout { message } => message.clone(),
            Self::Network(e) if e.is_timeout() => "Request timed out.".to_string(),
            Self::Network(e) => format!("Network error: {e}"),
            Self::StructuralChange { reason } => reason.clone(),
            Self::Browser(e) => format!("Browser automation failed: {e}"),
            Self::Decode(reason) => format!("Unexpected response from source: {reason}"),
            other => format!("Unexpected error: {other}"),
        }
    }
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
