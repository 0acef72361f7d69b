//! Error types for NEXUS
//!
//! This module defines all error types used throughout the backend,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for NEXUS operations
///
/// Only persistence and configuration faults are expected to reach a caller.
/// Backend failures are absorbed by the orchestrator and sandbox escapes are
/// reported in-band, but both still have variants so the lower layers can
/// describe what went wrong.
#[derive(Error, Debug)]
pub enum NexusError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model backend errors (network, bad status, malformed body)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Model backend did not answer within the configured timeout
    #[error("Backend timed out after {0} seconds")]
    Timeout(u64),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limited by the model backend (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Sandbox path resolution failures
    #[error("Sandbox error: {0}")]
    Sandbox(String),

    /// Session, message and execution-log storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for NEXUS operations
///
/// Uses `anyhow::Error` so call sites can attach context while still
/// downcasting to [`NexusError`] where the variant matters.
pub type Result<T> = anyhow::Result<T>;
