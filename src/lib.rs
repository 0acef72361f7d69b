//! NEXUS - conversational pentest assistant backend library
//!
//! This library provides the chat orchestration, simulated tool execution
//! and sandboxed file access behind the NEXUS API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `catalog`: Static registry of known security tools
//! - `synth`: Simulated tool output synthesis
//! - `storage`: Session, chat history and execution log persistence
//! - `agent`: Conversation orchestrator, tool-call extraction and execution log
//! - `providers`: Model backend abstraction and implementations (OpenAI, Ollama)
//! - `prompts`: Persona and prompt assembly
//! - `tools`: Sandboxed virtual filesystem
//! - `service`: Service context wiring every component from a `Config`
//! - `server`: HTTP routes
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`, `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use nexus::{Config, NexusService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let service = NexusService::from_config(config)?;
//!     let reply = service
//!         .chat(&nexus::service::ChatRequest {
//!             session_id: "s1".to_string(),
//!             message: "scan example.com".to_string(),
//!         })
//!         .await?;
//!     println!("{}", reply.response);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod server;
pub mod service;
pub mod storage;
pub mod synth;
pub mod tools;

// Re-export commonly used types
pub use agent::{ChatResponse, ConversationOrchestrator, ToolExecutionLog};
pub use catalog::ToolCatalog;
pub use config::Config;
pub use error::{NexusError, Result};
pub use service::NexusService;
pub use synth::OutputSynthesizer;

#[cfg(test)]
pub mod test_utils;
