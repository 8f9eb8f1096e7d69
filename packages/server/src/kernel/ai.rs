// Generation service implementation using the Anthropic Messages API
//
// This is the infrastructure implementation of BaseAI.
// Business logic (what to prompt for, how to parse it) lives in domains/summaries.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::BaseAI;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Generation client errors.
#[derive(Debug, Error)]
pub enum AIError {
    /// Configuration error (missing API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (unexpected response body)
    #[error("Parse error: {0}")]
    Parse(String),

    /// No answer within the configured bound
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The response carried no text block
    #[error("Empty response from model")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenate every text block.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Anthropic implementation of the generation service
#[derive(Clone)]
pub struct ClaudeClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Set a custom base URL (for proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn create_message(&self, prompt: &str, max_tokens: u32) -> Result<String, AIError> {
        let start = std::time::Instant::now();

        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, model = %self.model, "Generation request failed");
                AIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Generation API error");
            return Err(AIError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AIError::Parse(e.to_string()))?;

        let text = body.into_text().ok_or(AIError::EmptyResponse)?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "Generation call complete"
        );

        Ok(text)
    }
}

#[async_trait]
impl BaseAI for ClaudeClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        info!(
            model = %self.model,
            prompt_length = prompt.len(),
            max_tokens,
            "Calling generation service"
        );
        Ok(self.create_message(prompt, max_tokens).await?)
    }
}

/// Stand-in used when no API key is configured; every call fails fast.
pub struct DisabledAI {
    model: String,
}

impl DisabledAI {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[async_trait]
impl BaseAI for DisabledAI {
    fn model(&self) -> &str {
        &self.model
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(AIError::Config("ANTHROPIC_API_KEY not set".into()).into())
    }
}

/// Pick the generation backend for the given configuration
pub fn create_ai(api_key: Option<String>, model: &str) -> Arc<dyn BaseAI> {
    match api_key {
        Some(key) => Arc::new(ClaudeClient::new(key, model)),
        None => {
            warn!("ANTHROPIC_API_KEY not set; summaries will use heuristic fallback");
            Arc::new(DisabledAI::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = ClaudeClient::new("sk-test", "claude-3-haiku-20240307")
            .with_base_url("https://proxy.example.org");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url, "https://proxy.example.org");
        assert_eq!(client.model(), "claude-3-haiku-20240307");
    }

    #[test]
    fn test_response_text_joins_text_blocks() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"summary\":"},{"type":"tool_use","id":"x"},{"type":"text","text":"\"ok\"}"}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_text().as_deref(), Some("{\"summary\":\"ok\"}"));
    }

    #[test]
    fn test_response_without_text_is_empty() {
        let body: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(body.into_text().is_none());
    }

    #[tokio::test]
    async fn test_disabled_ai_always_fails() {
        let ai = DisabledAI::new("claude-3-haiku-20240307");
        let err = ai.complete("hello", 10).await.unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_create_ai_without_key_is_disabled() {
        let ai = create_ai(None, "claude-3-haiku-20240307");
        assert_eq!(ai.model(), "claude-3-haiku-20240307");
        assert!(!ai.enabled());
        assert!(tokio_test::block_on(ai.complete("hello", 10)).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_complete() {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .expect("ANTHROPIC_API_KEY must be set for integration tests");

        let client = ClaudeClient::new(api_key, crate::DEFAULT_SUMMARY_MODEL);

        let response = client
            .complete("Say 'Hello, World!' and nothing else.", 20)
            .await
            .expect("Completion should succeed");

        assert!(response.contains("Hello"));
    }
}
