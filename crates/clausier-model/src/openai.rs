//! OpenAI chat-completions client
//!
//! Sends one prompt per request to the `/chat/completions` endpoint and
//! returns the raw assistant text. HTTP status codes map onto the
//! `ModelError` taxonomy; there is no retry loop here, a failed call is
//! reported to the orchestrator as-is.
//!
//! # Examples
//!
//! ```no_run
//! use clausier_model::OpenAiClient;
//!
//! let client = OpenAiClient::new("sk-...", "gpt-4o-mini")
//!     .with_generation(2000, 0.1);
//! ```

use crate::ModelError;
use async_trait::async_trait;
use clausier_domain::ModelClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// System message fixed for all extraction calls
const SYSTEM_MESSAGE: &str = "You are a legal document analysis expert. Return only valid JSON arrays.";

/// OpenAI chat-completions provider.
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    model: String,
    max_output_tokens: u32,
    temperature: f64,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client for the default OpenAI endpoint.
    ///
    /// # Parameters
    ///
    /// - `api_key`: bearer token for the API
    /// - `model`: model to use (e.g. "gpt-4o-mini")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap();

        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_output_tokens: 2000,
            temperature: 0.1,
            client,
        }
    }

    /// Point the client at a different endpoint (proxies, compatible APIs).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set generation parameters.
    pub fn with_generation(mut self, max_output_tokens: u32, temperature: f64) -> Self {
        self.max_output_tokens = max_output_tokens;
        self.temperature = temperature;
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder().timeout(timeout).build().unwrap();
        self
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_completion_tokens: self.max_output_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::Transport(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ModelError::Auth(format!("HTTP {}", status)));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ModelError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ModelError::Transport(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Transport(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        debug!("Model response length: {} chars", content.len());
        Ok(content)
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    type Error = ModelError;

    async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        self.send(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new("sk-test", "gpt-4o-mini");
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(client.model(), "gpt-4o-mini");
        assert_eq!(client.max_output_tokens, 2000);
    }

    #[test]
    fn test_client_with_endpoint_and_generation() {
        let client = OpenAiClient::new("sk-test", "gpt-4o-mini")
            .with_endpoint("http://localhost:8080/v1")
            .with_generation(512, 0.0);

        assert_eq!(client.endpoint, "http://localhost:8080/v1");
        assert_eq!(client.max_output_tokens, 512);
        assert_eq!(client.temperature, 0.0);
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.1,
            max_completion_tokens: 100,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_completion_tokens"], 100);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"content":"[]"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("[]"));
    }
}
