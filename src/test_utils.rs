//! Test utilities for NEXUS
//!
//! This module provides common test helpers: temporary storage and sandbox
//! directories, a test configuration, and hand-written model backends.

use crate::config::Config;
use crate::error::{NexusError, Result};
use crate::providers::Provider;
use crate::storage::SqliteStorage;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create SQLite storage inside a fresh temporary directory
///
/// Returns the `TempDir` too so the caller keeps it alive.
pub fn temp_storage() -> (Arc<SqliteStorage>, TempDir) {
    let dir = temp_dir();
    let storage = SqliteStorage::new_with_path(dir.path().join("nexus.db"))
        .expect("Failed to create test storage");
    (Arc::new(storage), dir)
}

/// Configuration pointing storage and sandbox into `dir`
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.db_path = Some(dir.path().join("nexus.db"));
    config.sandbox.root = dir.path().join("sandbox");
    config
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let message = format!("{:#}", e);
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}

/// Backend that always answers with a fixed reply and records its inputs
#[derive(Debug, Default)]
pub struct MockProvider {
    reply: String,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl MockProvider {
    /// Creates a mock answering `reply` to every prompt
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, prompt)| prompt.clone())
            .collect()
    }

    /// Personas received so far, in call order
    pub fn personas(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, persona, _)| persona.clone())
            .collect()
    }

    /// Session ids received so far, in call order
    pub fn session_ids(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(session_id, _, _)| session_id.clone())
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn send(&self, session_id: &str, system_persona: &str, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push((
            session_id.to_string(),
            system_persona.to_string(),
            prompt.to_string(),
        ));
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> String {
        "mock-model".to_string()
    }
}

/// Backend that always fails with a prepared error
pub struct FailingProvider {
    make_error: fn(&str) -> NexusError,
    message: String,
}

impl FailingProvider {
    /// Fails every call with `NexusError::Provider(message)`
    pub fn provider_error(message: impl Into<String>) -> Self {
        Self {
            make_error: |m| NexusError::Provider(m.to_string()),
            message: message.into(),
        }
    }

    /// Fails every call with `NexusError::MissingCredentials`
    pub fn missing_key() -> Self {
        Self {
            make_error: |m| NexusError::MissingCredentials(m.to_string()),
            message: "openai".to_string(),
        }
    }
}

#[async_trait]
impl Provider for FailingProvider {
    async fn send(&self, _session_id: &str, _persona: &str, _prompt: &str) -> Result<String> {
        Err((self.make_error)(&self.message).into())
    }

    fn name(&self) -> &'static str {
        "failing"
    }

    fn model(&self) -> String {
        "none".to_string()
    }
}

/// Backend that sleeps before answering, for timeout tests
pub struct SlowProvider {
    delay: Duration,
}

impl SlowProvider {
    /// Creates a backend that answers after `delay`
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Provider for SlowProvider {
    async fn send(&self, _session_id: &str, _persona: &str, _prompt: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }

    fn name(&self) -> &'static str {
        "slow"
    }

    fn model(&self) -> String {
        "slow-model".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_storage_creates_database() {
        let (storage, _dir) = temp_storage();
        assert!(storage.db_path().exists());
    }

    #[test]
    fn test_test_config_is_valid() {
        let dir = temp_dir();
        let config = test_config(&dir);
        assert!(config.validate().is_ok());
        assert!(config.sandbox.root.starts_with(dir.path()));
    }

    #[test]
    fn test_assert_error_contains_matches() {
        let result: Result<()> = Err(NexusError::Config("invalid".to_string()).into());
        assert_error_contains(result, "invalid");
    }

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockProvider::new("hi");
        assert_eq!(provider.send("s1", "p", "q").await.unwrap(), "hi");
        assert_eq!(provider.session_ids(), vec!["s1"]);
        assert_eq!(provider.personas(), vec!["p"]);
        assert_eq!(provider.prompts(), vec!["q"]);
    }
}
