use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipelineError, ServiceError};
use crate::llm::Gateway;

pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-3-7-sonnet-20250219")
    pub model: String,
    /// API root, without the `/v1/messages` path
    pub base_url: String,
    /// Upper bound on a single request, including reading the body
    pub timeout: Duration,
    /// Extra attempts after a retryable failure
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one
    pub initial_backoff: Duration,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values are treated the same as unset ones
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = var("ANTHROPIC_API_KEY").ok_or_else(|| {
            PipelineError::Configuration(
                "ANTHROPIC_API_KEY environment variable not set".to_string(),
            )
        })?;

        let mut config = Self::new(
            api_key,
            var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        );
        if let Some(base_url) = var("ANTHROPIC_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send a single message to Claude and return the first text block
    async fn send_message(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ServiceError> {
        let request = AnthropicRequest {
            model: &self.config.model,
            max_tokens,
            temperature,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ServiceError::Authentication {
                        status: status.as_u16(),
                        body,
                    }
                }
                StatusCode::TOO_MANY_REQUESTS => ServiceError::RateLimited { body },
                _ => ServiceError::Provider {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        // Extract text from the first content block
        response
            .content
            .into_iter()
            .next()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text)
            .ok_or_else(|| ServiceError::MalformedResponse("no text content in response".to_string()))
    }
}

#[async_trait]
impl Gateway for AnthropicClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ServiceError> {
        let mut attempt = 0;

        loop {
            let outcome = tokio::time::timeout(
                self.config.timeout,
                self.send_message(system_prompt, user_prompt, max_tokens, temperature),
            )
            .await
            .unwrap_or_else(|_| Err(ServiceError::Timeout(self.config.timeout)));

            match outcome {
                Ok(text) => {
                    debug!("Received {} chars from {}", text.len(), self.config.model);
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self
                        .config
                        .initial_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        "Request failed ({}), retry {} of {} in {:?}",
                        e, attempt, self.config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
