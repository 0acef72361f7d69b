//! Provider module for NEXUS
//!
//! This module contains the model backend abstraction and implementations
//! for OpenAI-compatible APIs and Ollama.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{persona_exchange, Message, Provider};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::{NexusError, Result};

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
///
/// # Examples
///
/// ```
/// use nexus::config::ProviderConfig;
/// use nexus::providers::create_provider;
///
/// let provider = create_provider(&ProviderConfig::default()).unwrap();
/// assert_eq!(provider.name(), "openai");
/// ```
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(config.openai.clone())?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        other => Err(NexusError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_ollama() {
        let config = ProviderConfig {
            provider_type: "ollama".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama3.2:latest");
    }

    #[test]
    fn test_create_provider_unknown_type() {
        let config = ProviderConfig {
            provider_type: "bedrock".to_string(),
            ..Default::default()
        };
        assert!(create_provider(&config).is_err());
    }
}
