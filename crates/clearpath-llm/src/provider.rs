//! Completion backend seam.
//!
//! Interpretation only ever sends one self-contained prompt and reads one
//! text reply, so the request carries a single prompt rather than a
//! conversation.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A model backend able to answer one prompt.
///
/// One instance is shared by every concurrent source task.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the prompt and wait for the reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short name used in log fields.
    fn provider_id(&self) -> &str;
}

/// One prompt plus sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Falls back to the provider's own default.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Reply text and the bookkeeping the backend returned with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Concatenated text blocks.
    pub content: String,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// True when the backend stopped on the token ceiling, so JSON replies
    /// are likely cut off.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

/// Token counts reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = CompletionRequest::new("Is ACME VENTURES LLC taken?")
            .with_model("claude-haiku-4-5-20251001")
            .with_max_tokens(300)
            .with_temperature(0.0)
            .with_system_prompt("Reply with JSON");

        assert_eq!(req.prompt, "Is ACME VENTURES LLC taken?");
        assert_eq!(req.model.as_deref(), Some("claude-haiku-4-5-20251001"));
        assert_eq!(req.max_tokens, Some(300));
        assert_eq!(req.temperature, Some(0.0));
        assert_eq!(req.system_prompt.as_deref(), Some("Reply with JSON"));
    }

    #[test]
    fn test_truncated_reply() {
        let mut response = CompletionResponse {
            content: "{\"availability\": \"tak".to_string(),
            model: "m".to_string(),
            stop_reason: Some("max_tokens".to_string()),
            usage: None,
        };
        assert!(response.is_truncated());
        response.stop_reason = Some("end_turn".to_string());
        assert!(!response.is_truncated());
    }
}
