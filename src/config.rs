//! Configuration management for NEXUS
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! A [`Config`] is built once at process start and then shared read-only
//! (behind an `Arc`) with every component that needs it.

use crate::error::{NexusError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for NEXUS
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model backend configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// File sandbox configuration
    #[serde(default)]
    pub sandbox: SandboxConfig,
    /// Conversation orchestration settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Simulated tool execution settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Provider configuration
///
/// Specifies which model backend to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use ("openai" or "ollama")
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// OpenAI-compatible chat completions configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Model to request
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Base URL of the chat completions API (no trailing slash)
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// API key; normally supplied through the environment
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            api_base: default_openai_api_base(),
            api_key: None,
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allowed CORS origins; `*` allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8001".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path; defaults to the user's data directory
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// File sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Directory under which every file operation must resolve
    #[serde(default = "default_sandbox_root")]
    pub root: PathBuf,
}

fn default_sandbox_root() -> PathBuf {
    PathBuf::from("/tmp/pentest_sandbox")
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: default_sandbox_root(),
        }
    }
}

/// Most prior messages a model prompt may carry
pub const MAX_HISTORY_LIMIT: usize = 10;

/// Conversation orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of prior messages included in the model prompt, at most
    /// [`MAX_HISTORY_LIMIT`]
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Number of messages returned by the chat history endpoint
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,

    /// Number of sessions returned by the session list
    #[serde(default = "default_session_list_limit")]
    pub session_list_limit: usize,

    /// Upper bound for a single model backend call (seconds)
    #[serde(default = "default_backend_timeout")]
    pub backend_timeout_seconds: u64,
}

fn default_history_limit() -> usize {
    10
}

fn default_history_page_size() -> usize {
    100
}

fn default_session_list_limit() -> usize {
    50
}

fn default_backend_timeout() -> u64 {
    60
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            history_page_size: default_history_page_size(),
            session_list_limit: default_session_list_limit(),
            backend_timeout_seconds: default_backend_timeout(),
        }
    }
}

/// Simulated tool execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Number of execution records returned per session
    #[serde(default = "default_execution_history_limit")]
    pub execution_history_limit: usize,
}

fn default_execution_history_limit() -> usize {
    50
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            execution_history_limit: default_execution_history_limit(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NexusError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| NexusError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("NEXUS_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        // Explicit key wins; the other names are accepted for compatibility
        // with existing deployments.
        for key_var in ["NEXUS_OPENAI_API_KEY", "EMERGENT_LLM_KEY", "OPENAI_API_KEY"] {
            if let Ok(key) = std::env::var(key_var) {
                if !key.is_empty() {
                    self.provider.openai.api_key = Some(key);
                    tracing::debug!("API key loaded from {}", key_var);
                    break;
                }
            }
        }

        if let Ok(model) = std::env::var("NEXUS_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("NEXUS_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(ollama_host) = std::env::var("NEXUS_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("NEXUS_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        if let Ok(bind) = std::env::var("NEXUS_BIND") {
            self.server.bind = bind;
        }

        if let Ok(origins) = std::env::var("NEXUS_CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !origins.is_empty() {
                tracing::debug!(?origins, "Env override: NEXUS_CORS_ORIGINS");
                self.server.cors_origins = origins;
            }
        }

        if let Ok(db_path) = std::env::var("NEXUS_DB_PATH") {
            self.storage.db_path = Some(PathBuf::from(db_path));
        }

        if let Ok(root) = std::env::var("NEXUS_SANDBOX_ROOT") {
            self.sandbox.root = PathBuf::from(root);
        }

        if let Ok(timeout) = std::env::var("NEXUS_BACKEND_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.chat.backend_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid NEXUS_BACKEND_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(db_path) = &cli.db_path {
            tracing::info!("Using storage DB override from CLI: {}", db_path.display());
            self.storage.db_path = Some(db_path.clone());
        }

        if let crate::cli::Commands::Serve {
            bind: Some(bind), ..
        } = &cli.command
        {
            self.server.bind = bind.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `NexusError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(NexusError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(NexusError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.chat.history_limit == 0 {
            return Err(
                NexusError::Config("chat.history_limit must be greater than 0".to_string())
                    .into(),
            );
        }

        if self.chat.history_limit > MAX_HISTORY_LIMIT {
            return Err(NexusError::Config(format!(
                "chat.history_limit must be less than or equal to {}",
                MAX_HISTORY_LIMIT
            ))
            .into());
        }

        if self.chat.history_page_size == 0 || self.chat.session_list_limit == 0 {
            return Err(NexusError::Config(
                "chat page sizes must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.backend_timeout_seconds == 0 {
            return Err(NexusError::Config(
                "chat.backend_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.tools.execution_history_limit == 0 {
            return Err(NexusError::Config(
                "tools.execution_history_limit must be greater than 0".to_string(),
            )
            .into());
        }

        if self.sandbox.root.as_os_str().is_empty() {
            return Err(NexusError::Config("sandbox.root cannot be empty".to_string()).into());
        }

        Ok(())
    }
}
