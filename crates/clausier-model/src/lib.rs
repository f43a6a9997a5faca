//! Clausier Model Client Layer
//!
//! Pluggable implementations of the `ModelClient` trait from
//! `clausier-domain`.
//!
//! # Providers
//!
//! - `MockClient`: deterministic mock for testing
//! - `OpenAiClient`: OpenAI chat-completions API integration
//!
//! Clients do not retry on failure. One call maps to one outbound request;
//! the extraction orchestrator decides what a failed chunk means.
//!
//! # Examples
//!
//! ```
//! use clausier_model::MockClient;
//! use clausier_domain::ModelClient;
//!
//! # async fn example() {
//! let client = MockClient::new("[]");
//! let result = client.complete("test prompt").await.unwrap();
//! assert_eq!(result, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use clausier_domain::ModelClient;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiClient;

/// Failure categories for a model invocation.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The call exceeded its time budget
    #[error("Model call timed out")]
    Timeout,

    /// The provider rejected the call for rate limiting
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid or missing credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network or HTTP-level failure, including undecodable responses
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with no usable text
    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Mock model client for deterministic testing.
///
/// Returns a fixed default response, or a scripted sequence of results
/// consumed one per call. No network access.
///
/// # Examples
///
/// ```
/// use clausier_model::{MockClient, ModelError};
/// use clausier_domain::ModelClient;
///
/// # async fn example() {
/// // Scripted: first call succeeds, second fails
/// let client = MockClient::with_script(vec![
///     Ok("[]".to_string()),
///     Err(ModelError::Timeout),
/// ]);
/// assert!(client.complete("p1").await.is_ok());
/// assert!(client.complete("p2").await.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockClient {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, ModelError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    /// Create a MockClient that returns the same response for every prompt.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockClient that plays back `results` in order, then falls
    /// back to an empty-array response.
    pub fn with_script(results: Vec<Result<String, ModelError>>) -> Self {
        Self {
            default_response: "[]".to_string(),
            script: Arc::new(Mutex::new(results.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl ModelClient for MockClient {
    type Error = ModelError;

    async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_default() {
        let client = MockClient::new("Test response");
        assert_eq!(client.complete("any prompt").await.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_client_script_playback() {
        let client = MockClient::with_script(vec![
            Ok("first".to_string()),
            Err(ModelError::RateLimited),
            Ok("third".to_string()),
        ]);

        assert_eq!(client.complete("a").await.unwrap(), "first");
        assert!(matches!(
            client.complete("b").await,
            Err(ModelError::RateLimited)
        ));
        assert_eq!(client.complete("c").await.unwrap(), "third");
        // Script exhausted, falls back to default
        assert_eq!(client.complete("d").await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_mock_client_records_prompts() {
        let client = MockClient::default();
        client.complete("prompt1").await.unwrap();
        client.complete("prompt2").await.unwrap();

        assert_eq!(client.call_count(), 2);
        assert_eq!(client.prompts(), vec!["prompt1", "prompt2"]);
    }

    #[tokio::test]
    async fn test_mock_client_clone_shares_state() {
        let client1 = MockClient::default();
        let client2 = client1.clone();

        client1.complete("shared").await.unwrap();
        assert_eq!(client2.call_count(), 1);
    }

    #[test]
    fn test_model_error_display() {
        assert_eq!(ModelError::Timeout.to_string(), "Model call timed out");
        assert_eq!(
            ModelError::Auth("bad key".into()).to_string(),
            "Authentication failed: bad key"
        );
    }
}
