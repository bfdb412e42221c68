//! Anthropic API client for stage invocations
//!
//! Every invocation is stateless: no conversation history is maintained.
//! Rate limits and transient server errors are retried with exponential
//! backoff; all other failures surface to the caller.

use crate::auth;
use crate::types::{AnthropicMessage, AnthropicRequest, AnthropicResponse, Completion, Model};
use async_trait::async_trait;
use forge_core::{ForgeError, Result};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: usize = 16000;

// Rate limit retry configuration
const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_SECS: u64 = 10;
const MAX_BACKOFF_SECS: u64 = 300;

/// The seam every pipeline stage calls the model through
///
/// The live implementation is [`AgentClient`]; tests substitute a scripted
/// stub so no network is involved.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the model's text output
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<Completion>;
}

/// Client for the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    model: Model,
    max_tokens: usize,
    api_key_env: String,
}

impl AgentClient {
    /// Create a new client for the given model
    pub fn new(model: Model) -> Self {
        Self {
            http: reqwest::Client::new(),
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }

    /// Set max tokens for responses
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the environment variable the API key is read from
    pub fn with_api_key_env(mut self, api_key_env: impl Into<String>) -> Self {
        self.api_key_env = api_key_env.into();
        self
    }

    pub fn model(&self) -> Model {
        self.model
    }
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new(Model::default())
    }
}

#[async_trait]
impl CompletionClient for AgentClient {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<Completion> {
        let auth_token = auth::get_auth_token(&self.api_key_env)?;

        let request = AnthropicRequest {
            model: self.model.api_name().to_string(),
            max_tokens: self.max_tokens,
            system: system.map(|s| s.to_string()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let mut retries = 0;
        let mut backoff_secs = INITIAL_BACKOFF_SECS;

        loop {
            tracing::debug!("Sending request to Anthropic API (attempt {})", retries + 1);

            let response = self
                .http
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &auth_token)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| ForgeError::Api(format!("Failed to send request: {}", e)))?;

            let status = response.status();

            // Handle rate limit (429) with retry
            if status.as_u16() == 429 {
                retries += 1;

                if retries > MAX_RETRIES {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown".to_string());
                    return Err(ForgeError::ApiLimit(format!(
                        "Rate limit exceeded after {} retries. Last error: {}",
                        MAX_RETRIES, error_text
                    )));
                }

                // Parse retry-after header if present, otherwise back off
                let wait_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(backoff_secs);

                tracing::warn!(
                    "Rate limited (429). Waiting {} seconds before retry {}/{}",
                    wait_secs,
                    retries,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown".to_string());

                // Retry on 5xx errors
                if status.is_server_error() && retries < MAX_RETRIES {
                    retries += 1;
                    tracing::warn!(
                        "Server error ({}). Waiting {} seconds before retry {}/{}",
                        status,
                        backoff_secs,
                        retries,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                return Err(ForgeError::Api(format!(
                    "Anthropic API error {}: {}",
                    status, error_text
                )));
            }

            let anthropic_response: AnthropicResponse = response
                .json()
                .await
                .map_err(|e| ForgeError::Api(format!("Failed to parse response: {}", e)))?;

            let text = anthropic_response
                .content
                .first()
                .ok_or_else(|| ForgeError::Api("No content in response".to_string()))?
                .text
                .clone();

            let usage = anthropic_response.usage;

            if let Some(ref usage_info) = usage {
                tracing::info!(
                    "Model call complete ({} chars, {} input tokens, {} output tokens)",
                    text.len(),
                    usage_info.input_tokens,
                    usage_info.output_tokens
                );
            } else {
                tracing::info!("Model call complete ({} chars)", text.len());
            }

            return Ok(Completion { text, usage });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_client_builder() {
        let client = AgentClient::new(Model::Opus)
            .with_max_tokens(8000)
            .with_api_key_env("FORGE_KEY");
        assert_eq!(client.model, Model::Opus);
        assert_eq!(client.max_tokens, 8000);
        assert_eq!(client.api_key_env, "FORGE_KEY");
    }
}
