//! Generation provider client
//!
//! `GenerationClient` is the seam the orchestrator is written against;
//! `AnthropicClient` is the real implementation, tests inject mocks.

pub mod retry;

pub use retry::{send_with_retry, RetryConfig};

use crate::config::Config;
use crate::error::ApiError;
use async_trait::async_trait;
use serde::Deserialize;

/// One block of generated text in a provider reply
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: String,
}

/// The slice of the provider's messages response this system consumes
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// Whether the model stopped because it hit the token ceiling
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }

    /// The generated text, if the reply carries any
    pub fn text(&self) -> Option<&str> {
        self.content
            .first()
            .map(|block| block.text.as_str())
            .filter(|text| !text.is_empty())
    }
}

/// Seam between the orchestrator and the generation provider
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send one composed prompt and return the provider's reply
    async fn create_message(&self, prompt: &str) -> Result<MessagesResponse, ApiError>;
}

/// Client for the Anthropic Messages API
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    retry: RetryConfig,
}

impl AnthropicClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.anthropic_api_key.clone(),
            base_url: config.anthropic_base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            retry: RetryConfig::default(),
        }
    }
}

#[async_trait]
impl GenerationClient for AnthropicClient {
    async fn create_message(&self, prompt: &str) -> Result<MessagesResponse, ApiError> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;

        let url = format!("{}/v1/messages", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        log::info!(
            "Sending request to Anthropic API (model {}, max_tokens {}, prompt {} chars)",
            self.model,
            self.max_tokens,
            prompt.len()
        );

        let response = send_with_retry(
            || {
                self.http
                    .post(&url)
                    .header("x-api-key", api_key)
                    .header("anthropic-version", "2023-06-01")
                    .header("content-type", "application/json")
                    .json(&body)
                    .send()
            },
            &self.retry,
            None::<fn(u32, u64)>,
        )
        .await?;

        let reply: MessagesResponse = response.json().await?;
        log::info!(
            "Anthropic API response: stop_reason={:?}, {} content block(s)",
            reply.stop_reason,
            reply.content.len()
        );
        Ok(reply)
    }
}
