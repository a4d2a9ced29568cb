//! Blocking Anthropic Messages API client.
//!
//! One narrow interface for every model call so the deterministic core
//! stays fully testable without the network.

use dsd_core::{Error, Result};
use serde_json::{json, Value};
use ureq::Agent;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Default model used for extraction and mapping.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// A blocking Claude API client.
pub struct ClaudeClient {
    agent: Agent,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    /// Create a client for the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a single text prompt and return the response text.
    pub fn complete_text(&self, prompt: &str) -> Result<String> {
        self.complete(vec![json!({ "type": "text", "text": prompt })])
    }

    /// Send one user message built from the given content blocks and
    /// return the response text.
    pub fn complete(&self, content: Vec<Value>) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [ { "role": "user", "content": content } ],
        });

        log::debug!("calling model {}", self.model);

        let mut response = self
            .agent
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send_json(&body)
            .map_err(|e| Error::HttpError(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .body_mut()
            .read_json()
            .map_err(|e| Error::HttpError(e.to_string()))?;

        if !status.is_success() {
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            return Err(Error::ApiError(format!("HTTP {}: {}", status, message)));
        }

        response_text(&payload)
    }
}

/// Pull the first text block out of a Messages API response.
fn response_text(payload: &Value) -> Result<String> {
    payload
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::ApiError("response had no text content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_extraction() {
        let payload = json!({
            "content": [ { "type": "text", "text": "hello" } ]
        });
        assert_eq!(response_text(&payload).unwrap(), "hello");
    }

    #[test]
    fn test_response_without_text_is_error() {
        let payload = json!({ "content": [] });
        assert!(response_text(&payload).is_err());
    }
}
