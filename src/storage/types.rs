use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NexusError;

/// Parameter bag passed to a tool invocation
pub type ToolParameters = serde_json::Map<String, serde_json::Value>;

/// Metadata for a chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session
    pub id: String,
    /// User-facing display name
    pub name: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session last saw a chat turn
    pub updated_at: DateTime<Utc>,
    /// Number of messages written through chat turns
    pub message_count: u64,
}

impl Session {
    /// Creates a new, empty session with a fresh identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use nexus::storage::Session;
    ///
    /// let session = Session::new("Recon");
    /// assert_eq!(session.name, "Recon");
    /// assert_eq!(session.message_count, 0);
    /// assert_eq!(session.created_at, session.updated_at);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            message_count: 0,
        }
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human operator
    User,
    /// The AI persona
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(NexusError::Storage(format!("Unknown message role: {}", other))),
        }
    }
}

/// A tool-call intent extracted from model text
///
/// This is a provisional parse, not a validated invocation. The default
/// extractor only fills `raw`; other extractors may add fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDescriptor {
    /// Directive text following the sentinel marker
    pub raw: String,
    /// Any additional structured data an extractor produced
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ToolCallDescriptor {
    /// Creates a descriptor carrying only the raw directive text
    pub fn raw(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// One immutable message of a session's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier for the message
    pub id: String,
    /// Owning session
    pub session_id: String,
    /// Author of the message
    pub role: Role,
    /// Text content
    pub content: String,
    /// Tool calls extracted from an assistant reply, if any
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDescriptor>>,
    /// When the message was written
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a user message stamped with the current time
    pub fn user(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(session_id, Role::User, content, None)
    }

    /// Creates an assistant message stamped with the current time
    pub fn assistant(
        session_id: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Option<Vec<ToolCallDescriptor>>,
    ) -> Self {
        Self::new(session_id, Role::Assistant, content, tool_calls)
    }

    fn new(
        session_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        tool_calls: Option<Vec<ToolCallDescriptor>>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            role,
            content: content.into(),
            tool_calls,
            timestamp: Utc::now(),
        }
    }
}

/// Lifecycle state of a tool execution
///
/// `Running` is always the initial state; a record moves to exactly one
/// terminal state and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Dispatched, result not yet recorded
    Running,
    /// Completed with output
    Success,
    /// Completed with a failure
    Error,
}

impl ExecutionStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Whether the status is final
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(NexusError::Storage(format!(
                "Unknown execution status: {}",
                other
            ))),
        }
    }
}

/// Request to run a (simulated) tool on behalf of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Tool identifier, catalogued or not
    pub tool_name: String,
    /// Tool parameters
    #[serde(default)]
    pub parameters: ToolParameters,
    /// Owning session
    pub session_id: String,
}

/// Persisted log entry for one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionRecord {
    /// Unique identifier for the record
    pub id: String,
    /// Owning session
    pub session_id: String,
    /// Tool identifier
    pub tool_name: String,
    /// Parameters the tool was invoked with
    pub parameters: ToolParameters,
    /// When the invocation was dispatched
    pub timestamp: DateTime<Utc>,
    /// Current lifecycle state
    pub status: ExecutionStatus,
    /// Output text; empty while running
    #[serde(default)]
    pub output: String,
}

impl ToolExecutionRecord {
    /// Creates a `running` record for the given request
    pub fn running(request: &ToolInvocationRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: request.session_id.clone(),
            tool_name: request.tool_name.clone(),
            parameters: request.parameters.clone(),
            timestamp: Utc::now(),
            status: ExecutionStatus::Running,
            output: String::new(),
        }
    }
}

/// Result returned to the caller of a tool dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionResponse {
    /// Tool identifier
    pub tool_name: String,
    /// Terminal status
    pub status: ExecutionStatus,
    /// Synthesized output
    pub output: String,
    /// Synthetic elapsed time in seconds; not a measurement
    pub execution_time: f64,
}

/// Sort direction for ordered store queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first; the limit keeps the oldest entries
    Ascending,
    /// Newest first; the limit keeps the newest entries
    Descending,
}
