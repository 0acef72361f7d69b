//! OpenAI-compatible chat completions provider for NEXUS
//!
//! Talks to any server exposing `POST {api_base}/chat/completions` with
//! bearer-token authentication. The session id is forwarded as the `user`
//! field so the upstream can attribute requests per conversation.

use crate::config::OpenAiConfig;
use crate::error::{NexusError, Result};
use crate::providers::{persona_exchange, Message, Provider};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible API provider
///
/// Construction succeeds without an API key; calls then fail with
/// `NexusError::MissingCredentials` so the caller can report it in-band.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    user: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiProvider {
    /// Create a new OpenAI-compatible provider
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use nexus::config::OpenAiConfig;
    /// use nexus::providers::{OpenAiProvider, Provider};
    ///
    /// let provider = OpenAiProvider::new(OpenAiConfig::default()).unwrap();
    /// assert_eq!(provider.model(), "gpt-4o");
    /// assert!(!provider.has_credentials());
    /// ```
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("nexus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NexusError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            tracing::warn!("No API key configured for the OpenAI provider");
        }
        tracing::info!(
            "Initialized OpenAI provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Whether an API key is configured
    pub fn has_credentials(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn send(
        &self,
        session_id: &str,
        system_persona: &str,
        prompt: &str,
    ) -> Result<String> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(NexusError::MissingCredentials("openai".to_string()).into()),
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: persona_exchange(system_persona, prompt),
            user: session_id,
        };

        tracing::debug!(session_id, "Sending chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {}", e);
                NexusError::Provider(format!("OpenAI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            let err = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    NexusError::Authentication(error_text)
                }
                StatusCode::TOO_MANY_REQUESTS => NexusError::RateLimited(error_text),
                _ => NexusError::Provider(format!(
                    "OpenAI returned error {}: {}",
                    status, error_text
                )),
            };
            return Err(err.into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            NexusError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                "OpenAI usage: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| NexusError::Provider("OpenAI response had no choices".to_string()).into())
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
