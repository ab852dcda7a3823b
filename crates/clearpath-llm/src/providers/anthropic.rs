//! Anthropic Messages API backend.

use crate::error::{LlmError, Result};
use crate::provider::{CompletionRequest, CompletionResponse, LlmProvider, Usage};
use crate::providers::common::{build_http_client, truncate_body};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Messages API backend.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given API key.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create a new Anthropic provider with a specific default model.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            client: build_http_client(None)?,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Result<Self> {
        self.client = build_http_client(Some(timeout_secs))?;
        Ok(self)
    }

    /// Point the provider at a different API root (e.g. a proxy).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn to_api_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens.unwrap_or(1024),
            temperature: request.temperature,
            system: request.system_prompt.clone(),
        }
    }

    /// Joins text blocks; tool and other block kinds are dropped.
    fn convert_api_response(response: AnthropicResponse) -> CompletionResponse {
        let content = response
            .content
            .into_iter()
            .filter_map(|c| match c {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        CompletionResponse {
            content,
            model: response.model,
            stop_reason: response.stop_reason,
            usage: response.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest("empty prompt".to_string()));
        }
        let api_request = self.to_api_request(&request);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = truncate_body(&error_text, 500);
            let provider = "anthropic".to_string();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    LlmError::AuthenticationFailed { provider, message }
                }
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { provider, message },
                _ => LlmError::ApiError {
                    provider,
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let api_response: AnthropicResponse =
            response.json().await.map_err(|e| LlmError::ParseError {
                provider: "anthropic".to_string(),
                message: format!("Failed to parse response: {e}"),
            })?;

        Ok(Self::convert_api_response(api_response))
    }

    fn provider_id(&self) -> &'static str {
        "anthropic"
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_provider_creation() {
        let provider = AnthropicProvider::new("test-key").expect("create provider");
        assert_eq!(provider.provider_id(), "anthropic");
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_api_request_conversion() {
        let provider = AnthropicProvider::new("test-key").expect("create provider");
        let request = CompletionRequest::new("Hello")
            .with_model("claude-sonnet-4-6")
            .with_max_tokens(400)
            .with_system_prompt("Be brief");

        let api_request = provider.to_api_request(&request);

        assert_eq!(api_request.model, "claude-sonnet-4-6");
        assert_eq!(api_request.max_tokens, 400);
        assert_eq!(api_request.system.as_deref(), Some("Be brief"));
        assert_eq!(api_request.messages.len(), 1);
        assert_eq!(api_request.messages[0].role, "user");
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "{\"ok\": true}"}],
                "model": "claude-haiku-4-5-20251001",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 5}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("test-key")
            .expect("create provider")
            .with_base_url(server.uri());
        let response = provider
            .complete(CompletionRequest::new("ping"))
            .await
            .expect("completion succeeds");

        assert_eq!(response.content, "{\"ok\": true}");
        assert_eq!(
            response.usage,
            Some(Usage {
                input_tokens: 12,
                output_tokens: 5
            })
        );
        assert!(!response.is_truncated());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("test-key")
            .expect("create provider")
            .with_base_url(server.uri());
        let err = provider
            .complete(CompletionRequest::new("ping"))
            .await
            .expect_err("rate limited");
        assert!(matches!(err, LlmError::RateLimitExceeded { .. }));
    }
}
