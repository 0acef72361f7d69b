//! Ollama provider implementation for NEXUS
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server through its non-streaming `/api/chat` endpoint.

use crate::config::OllamaConfig;
use crate::error::{NexusError, Result};
use crate::providers::{persona_exchange, Message, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use nexus::config::OllamaConfig;
/// use nexus::providers::{OllamaProvider, Provider};
///
/// # async fn example() -> nexus::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let reply = provider.send("s1", "You are NEXUS", "Hello!").await?;
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

/// Response structure from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Message,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use nexus::config::OllamaConfig;
    /// use nexus::providers::OllamaProvider;
    ///
    /// let config = OllamaConfig {
    ///     host: "http://localhost:11434".to_string(),
    ///     model: "llama3.2:latest".to_string(),
    /// };
    /// let provider = OllamaProvider::new(config);
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("nexus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NexusError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn send(
        &self,
        session_id: &str,
        system_persona: &str,
        prompt: &str,
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let request = OllamaRequest {
            model: self.config.model.clone(),
            messages: persona_exchange(system_persona, prompt),
            stream: false,
        };

        tracing::debug!(session_id, "Sending Ollama request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                NexusError::Provider(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(NexusError::Provider(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            NexusError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            ollama_response.done,
            ollama_response.prompt_eval_count,
            ollama_response.eval_count
        );

        Ok(ollama_response.message.content)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
