//! Base provider trait and common types for NEXUS
//!
//! This module defines the Provider trait that every model backend must
//! implement, along with the chat message type sent over the wire.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Message structure for a chat completion request
///
/// Represents one message sent to, or returned by, a model backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message; `null` on the wire reads as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use nexus::providers::Message;
    ///
    /// let msg = Message::system("You are NEXUS");
    /// assert_eq!(msg.role, "system");
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use nexus::providers::Message;
    ///
    /// let msg = Message::user("scan example.com");
    /// assert_eq!(msg.role, "user");
    /// assert_eq!(msg.content, "scan example.com");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Builds the two-message exchange every backend receives
///
/// The persona goes in as the system message and the fully rendered prompt
/// (history included) as a single user message.
pub fn persona_exchange(system_persona: &str, prompt: &str) -> Vec<Message> {
    vec![Message::system(system_persona), Message::user(prompt)]
}

/// Model backend interface
///
/// A backend receives the persona and a rendered prompt and returns the
/// model's free-text reply. It is stateless across calls; conversational
/// memory lives in the prompt.
///
/// # Errors
///
/// Implementations return `NexusError::Provider` for unreachable backends
/// and malformed responses, `NexusError::Authentication` for rejected
/// credentials, `NexusError::RateLimited` when throttled and
/// `NexusError::MissingCredentials` when no credentials are configured.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Sends one prompt and returns the reply text
    ///
    /// # Arguments
    ///
    /// * `session_id` - Conversation the prompt belongs to; backends may
    ///   forward it as an end-user identifier
    /// * `system_persona` - System message describing the assistant
    /// * `prompt` - Rendered prompt including prior conversation
    async fn send(&self, session_id: &str, system_persona: &str, prompt: &str)
        -> Result<String>;

    /// Short backend name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Model the backend requests
    fn model(&self) -> String;
}
