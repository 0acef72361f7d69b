/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `serve`: Run the HTTP API
- `catalog`  — Print the tool catalog
- `history`  — List sessions and tool executions
- `sandbox`  — Initialize the file sandbox
*/

pub mod catalog;
pub mod history;
pub mod sandbox;
pub mod serve;

pub use catalog::handle_tools;
pub use history::{handle_executions, handle_sessions};
pub use sandbox::handle_sandbox_init;
pub use serve::handle_serve;
