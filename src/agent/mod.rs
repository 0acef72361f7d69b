//! Agent module for NEXUS
//!
//! This module contains the conversation orchestrator, tool-call extraction,
//! the tool execution log and their metrics.

pub mod executor;
pub mod extractor;
pub mod metrics;
pub mod orchestrator;

pub use executor::ToolExecutionLog;
pub use extractor::{SentinelParser, ToolCallParser, TOOL_SENTINEL};
pub use orchestrator::{ChatResponse, ConversationOrchestrator};
