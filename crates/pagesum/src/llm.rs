//! Chat-completion boundary
//!
//! [`ChatModel`] is the seam between the summarizer and the provider.
//! [`OpenAiClient`] speaks the OpenAI `/chat/completions` wire format.

use crate::config::Config;
use crate::error::{Error, LlmError};
use crate::prompt::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default completion length limit
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Generation parameters for a summary request
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ModelSettings {
    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Chat-completion request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Request for `messages` using `settings`
    pub fn new(settings: &ModelSettings, messages: impl Into<Vec<Message>>) -> Self {
        Self {
            model: settings.model.clone(),
            messages: messages.into(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Chat-completion response (partial)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Response with a single choice carrying `content`
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: Some(content.into()),
                },
            }],
        }
    }

    /// Text of the first choice, if any
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

/// A provider able to answer chat-completion requests
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Send one request; errors are returned as-is, never retried
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// OpenAI error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    /// Build a client for `base_url` (e.g. `https://api.openai.com/v1`)
    pub fn new(
        api_key: impl Into<String>,
        base_url: &Url,
        timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(LlmError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                base_url.as_str().trim_end_matches('/')
            ),
            api_key: api_key.into(),
        })
    }

    /// Build from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `PAGESUM_TIMEOUT_SECS`
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let api_key = config.openai_api_key()?;
        let base_url = config.base_url()?;
        Ok(Self::new(api_key, &base_url, config.timeout()?)?)
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            "Sending chat completion"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(LlmError::Request)?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Request)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
