//! Command-line interface definition for NEXUS
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for serving the API and inspecting stored state.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NEXUS - conversational pentest assistant backend
///
/// Serves the chat, tool and sandbox API and offers a few local
/// inspection commands over the same storage.
#[derive(Parser, Debug, Clone)]
#[command(name = "nexus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the SQLite database path
    #[arg(long, env = "NEXUS_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for NEXUS
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Socket address to bind (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print the tool catalog
    Tools {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List stored chat sessions
    Sessions,

    /// List recent tool executions for a session
    Executions {
        /// Session identifier
        session_id: String,
    },

    /// Manage the file sandbox
    Sandbox {
        /// Sandbox subcommand
        #[command(subcommand)]
        command: SandboxCommand,
    },
}

/// Sandbox management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SandboxCommand {
    /// Create the sandbox layout and sample files
    Init,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_with_bind() {
        let cli = Cli::try_parse_from(["nexus", "serve", "--bind", "127.0.0.1:9000"]).unwrap();
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.as_deref(), Some("127.0.0.1:9000")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_tools_json() {
        let cli = Cli::try_parse_from(["nexus", "tools", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Tools { json: true }));
    }

    #[test]
    fn test_cli_parses_executions() {
        let cli = Cli::try_parse_from(["nexus", "executions", "abc"]).unwrap();
        match cli.command {
            Commands::Executions { session_id } => assert_eq!(session_id, "abc"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_sandbox_init() {
        let cli = Cli::try_parse_from(["nexus", "sandbox", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Sandbox {
                command: SandboxCommand::Init
            }
        ));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["nexus"]).is_err());
    }
}
