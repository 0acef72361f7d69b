//! Conversation orchestrator
//!
//! Runs one chat turn end to end:
//!
//! 1. fetch the most recent prior messages (bounded, oldest first)
//! 2. persist the user message
//! 3. render the prompt
//! 4. call the model backend under a timeout
//! 5. extract tool-call intents from the reply
//! 6. persist the assistant message
//! 7. refresh session metadata
//!
//! Backend failures never fail the turn; they become an in-band error reply.
//! Store failures are propagated.

use crate::agent::extractor::{SentinelParser, ToolCallParser};
use crate::agent::metrics::{record_chat_turn, BackendCallMetrics};
use crate::config::{ChatConfig, MAX_HISTORY_LIMIT};
use crate::error::{NexusError, Result};
use crate::prompts::{build_prompt, NEXUS_PERSONA};
use crate::providers::Provider;
use crate::storage::{ChatMessage, HistoryStore, SessionStore, SortOrder, ToolCallDescriptor};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Reply given when the backend has no credentials configured
pub const MISSING_KEY_REPLY: &str = "LLM API key not configured";

/// Prefix of the reply given when the backend call fails
pub const BACKEND_ERROR_PREFIX: &str = "Error communicating with AI: ";

/// Number of messages a turn adds to a session
const MESSAGES_PER_TURN: u64 = 2;

/// Result of one chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply text (or in-band error text)
    pub response: String,
    /// Extracted tool-call intents; `None` when there are none
    pub tool_calls: Option<Vec<ToolCallDescriptor>>,
    /// Session the turn belongs to
    pub session_id: String,
}

/// Drives chat turns against a model backend and the history stores
pub struct ConversationOrchestrator {
    history: Arc<dyn HistoryStore>,
    sessions: Arc<dyn SessionStore>,
    provider: Arc<dyn Provider>,
    parser: Box<dyn ToolCallParser>,
    persona: String,
    history_limit: usize,
    backend_timeout: Duration,
}

impl ConversationOrchestrator {
    /// Creates an orchestrator using the NEXUS persona and the sentinel parser
    pub fn new(
        history: Arc<dyn HistoryStore>,
        sessions: Arc<dyn SessionStore>,
        provider: Arc<dyn Provider>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            history,
            sessions,
            provider,
            parser: Box::new(SentinelParser::default()),
            persona: NEXUS_PERSONA.to_string(),
            history_limit: config.history_limit.min(MAX_HISTORY_LIMIT),
            backend_timeout: Duration::from_secs(config.backend_timeout_seconds),
        }
    }

    /// Replaces the tool-call parser
    pub fn with_parser(mut self, parser: Box<dyn ToolCallParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the system persona
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Overrides the backend timeout
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Runs one chat turn
    ///
    /// # Errors
    ///
    /// Returns `NexusError::Storage` if reading history, persisting either
    /// message, or updating the session fails. Backend failures are not
    /// errors.
    pub async fn handle_turn(&self, session_id: &str, user_message: &str) -> Result<ChatResponse> {
        tracing::info!(session_id, "Starting chat turn");

        let mut history = self
            .history
            .query_messages(session_id, self.history_limit, SortOrder::Descending)
            .await?;
        history.reverse();

        self.history
            .append(&ChatMessage::user(session_id, user_message))
            .await?;

        let prompt = build_prompt(&history, user_message);
        let (response, tool_calls) = match self.invoke_backend(session_id, &prompt).await {
            Ok(reply) => {
                let calls = self.parser.parse(&reply);
                let calls = if calls.is_empty() { None } else { Some(calls) };
                (reply, calls)
            }
            Err(reply) => (reply, None),
        };

        self.history
            .append(&ChatMessage::assistant(
                session_id,
                response.clone(),
                tool_calls.clone(),
            ))
            .await?;

        self.sessions
            .touch(session_id, Utc::now(), MESSAGES_PER_TURN)
            .await?;

        record_chat_turn();
        tracing::info!(
            session_id,
            tool_calls = tool_calls.as_ref().map_or(0, Vec::len),
            "Chat turn complete"
        );

        Ok(ChatResponse {
            response,
            tool_calls,
            session_id: session_id.to_string(),
        })
    }

    /// Calls the backend, returning the reply or the in-band error text
    async fn invoke_backend(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> std::result::Result<String, String> {
        let metrics = BackendCallMetrics::new(self.provider.name());
        let call = self.provider.send(session_id, &self.persona, prompt);

        let failure = match tokio::time::timeout(self.backend_timeout, call).await {
            Ok(Ok(reply)) => {
                metrics.record_success();
                return Ok(reply);
            }
            Ok(Err(e)) => e,
            Err(_) => NexusError::Timeout(self.backend_timeout.as_secs()).into(),
        };

        let (reason, reply) = match failure.downcast_ref::<NexusError>() {
            Some(NexusError::MissingCredentials(_)) => {
                ("missing_credentials", MISSING_KEY_REPLY.to_string())
            }
            Some(NexusError::Timeout(_)) => ("timeout", format!("{}{}", BACKEND_ERROR_PREFIX, failure)),
            Some(NexusError::Authentication(_)) => {
                ("authentication", format!("{}{}", BACKEND_ERROR_PREFIX, failure))
            }
            Some(NexusError::RateLimited(_)) => {
                ("rate_limited", format!("{}{}", BACKEND_ERROR_PREFIX, failure))
            }
            _ => ("provider", format!("{}{}", BACKEND_ERROR_PREFIX, failure)),
        };

        metrics.record_failure(reason);
        tracing::warn!(session_id, reason, "Model backend call failed: {:#}", failure);
        Err(reply)
    }
}
