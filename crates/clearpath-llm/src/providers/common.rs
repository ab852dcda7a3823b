//! Common utilities shared across LLM providers.

use crate::error::{LlmError, Result};
use reqwest::Client;
use std::time::Duration;

/// Build a standard HTTP client with common timeout settings.
///
/// # Arguments
/// * `timeout_secs` - Timeout in seconds (defaults to 60 if not specified)
///
/// # Errors
/// Returns error if the HTTP client cannot be created.
pub fn build_http_client(timeout_secs: Option<u64>) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.unwrap_or(60)))
        .build()
        .map_err(|e| LlmError::Internal(format!("failed to create HTTP client: {e}")))
}

/// Truncate an error body for inclusion in error messages.
#[must_use]
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        body.to_string()
    } else {
        let mut truncated: String = body.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    }
}
