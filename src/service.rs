//! Service context
//!
//! [`NexusService`] is built once from a [`Config`] and owns every component
//! the API needs. It is immutable after construction; the HTTP layer and the
//! CLI share it behind an `Arc`.

use crate::agent::{ChatResponse, ConversationOrchestrator, ToolExecutionLog};
use crate::catalog::{CatalogByCategory, ToolCatalog};
use crate::config::Config;
use crate::error::Result;
use crate::providers::{create_provider, Provider};
use crate::storage::{
    ChatMessage, HistoryStore, Session, SessionStore, SortOrder, SqliteStorage,
    ToolExecutionRecord, ToolExecutionResponse, ToolInvocationRequest,
};
use crate::synth::OutputSynthesizer;
use crate::tools::{FileOperation, FileOperationResult, Sandbox, SandboxInitResult};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Banner returned by the API root
pub const API_BANNER: &str = "NEXUS Pentest LLM API v1.0";

/// Name given to sessions created without one
pub const DEFAULT_SESSION_NAME: &str = "New Session";

/// API root response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub message: String,
}

/// Identity of a newly created session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub id: String,
    pub name: String,
}

/// Session listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionList {
    pub sessions: Vec<Session>,
}

/// Acknowledgement of a session deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAck {
    pub status: String,
}

/// One chat turn request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

/// Chat history page, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    pub messages: Vec<ChatMessage>,
}

/// Tool catalog grouped by category
#[derive(Debug, Clone, Serialize)]
pub struct CatalogListing {
    pub tools: CatalogByCategory,
    pub categories: Vec<&'static str>,
}

impl CatalogListing {
    /// Listing of `catalog`
    pub fn new(catalog: &ToolCatalog) -> Self {
        Self {
            tools: catalog.by_category(),
            categories: catalog.categories().iter().map(|c| c.as_str()).collect(),
        }
    }
}

/// Execution log page, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionList {
    pub executions: Vec<ToolExecutionRecord>,
}

/// Everything the API operations need, wired from one configuration
pub struct NexusService {
    config: Arc<Config>,
    storage: Arc<SqliteStorage>,
    orchestrator: ConversationOrchestrator,
    executor: ToolExecutionLog,
    sandbox: Sandbox,
    catalog: ToolCatalog,
}

impl NexusService {
    /// Builds the service from configuration
    ///
    /// Opens the database and constructs the configured model backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the provider
    /// type is unknown.
    pub fn from_config(config: Config) -> Result<Self> {
        let storage = Arc::new(SqliteStorage::open(&config.storage)?);
        let provider: Arc<dyn Provider> = Arc::from(create_provider(&config.provider)?);
        tracing::info!(
            provider = provider.name(),
            model = %provider.model(),
            db = %storage.db_path().display(),
            "Service configured"
        );
        Ok(Self::with_parts(
            Arc::new(config),
            storage,
            provider,
            Arc::new(OutputSynthesizer::new()),
        ))
    }

    /// Builds the service from already constructed parts
    pub fn with_parts(
        config: Arc<Config>,
        storage: Arc<SqliteStorage>,
        provider: Arc<dyn Provider>,
        synthesizer: Arc<OutputSynthesizer>,
    ) -> Self {
        let catalog = ToolCatalog::builtin();
        let orchestrator = ConversationOrchestrator::new(
            storage.clone(),
            storage.clone(),
            provider,
            &config.chat,
        );
        let executor = ToolExecutionLog::new(
            storage.clone(),
            synthesizer,
            catalog,
            config.tools.execution_history_limit,
        );
        let sandbox = Sandbox::new(config.sandbox.root.clone());

        Self {
            config,
            storage,
            orchestrator,
            executor,
            sandbox,
            catalog,
        }
    }

    /// The configuration the service was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// API root banner
    pub fn banner(&self) -> Banner {
        Banner {
            message: API_BANNER.to_string(),
        }
    }

    /// Creates a session, named [`DEFAULT_SESSION_NAME`] when `name` is absent
    pub async fn create_session(&self, name: Option<String>) -> Result<SessionCreated> {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string());
        let session = Session::new(name);
        SessionStore::create(self.storage.as_ref(), &session).await?;
        tracing::info!(session_id = %session.id, "Session created");
        Ok(SessionCreated {
            id: session.id,
            name: session.name,
        })
    }

    /// Most recently updated sessions
    pub async fn list_sessions(&self) -> Result<SessionList> {
        let sessions = self
            .storage
            .list_by_update(self.config.chat.session_list_limit)
            .await?;
        Ok(SessionList { sessions })
    }

    /// Deletes a session and its messages
    ///
    /// Deleting an unknown session still succeeds.
    pub async fn delete_session(&self, session_id: &str) -> Result<DeleteAck> {
        let existed = SessionStore::delete(self.storage.as_ref(), session_id).await?;
        let removed = self.storage.delete_all(session_id).await?;
        tracing::info!(session_id, existed, removed, "Session deleted");
        Ok(DeleteAck {
            status: "deleted".to_string(),
        })
    }

    /// Runs one chat turn
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.orchestrator
            .handle_turn(&request.session_id, &request.message)
            .await
    }

    /// First page of a session's messages, oldest first
    pub async fn chat_history(&self, session_id: &str) -> Result<ChatHistory> {
        let messages = self
            .storage
            .query_messages(
                session_id,
                self.config.chat.history_page_size,
                SortOrder::Ascending,
            )
            .await?;
        Ok(ChatHistory { messages })
    }

    /// The tool catalog
    pub fn tools(&self) -> CatalogListing {
        CatalogListing::new(&self.catalog)
    }

    /// Simulates one tool run and logs it
    pub async fn execute_tool(
        &self,
        request: ToolInvocationRequest,
    ) -> Result<ToolExecutionResponse> {
        self.executor.dispatch(request).await
    }

    /// Recent tool executions of a session, newest first
    pub async fn executions(&self, session_id: &str) -> Result<ExecutionList> {
        let executions = self.executor.history(session_id).await?;
        Ok(ExecutionList { executions })
    }

    /// Runs one sandbox file operation
    pub async fn file_operation(&self, op: &FileOperation) -> FileOperationResult {
        self.sandbox.execute(op).await
    }

    /// Lists a sandbox directory
    pub async fn list_files(&self, path: &str) -> FileOperationResult {
        self.sandbox.list(path).await
    }

    /// Creates the sandbox layout and sample files
    pub async fn init_sandbox(&self) -> Result<SandboxInitResult> {
        self.sandbox.init().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ExecutionStatus, Role};
    use crate::test_utils::{temp_dir, test_config, MockProvider};
    use tempfile::TempDir;

    fn service(reply: &str) -> (NexusService, TempDir) {
        let dir = temp_dir();
        let config = test_config(&dir);
        let storage = Arc::new(SqliteStorage::open(&config.storage).unwrap());
        let service = NexusService::with_parts(
            Arc::new(config),
            storage,
            Arc::new(MockProvider::new(reply)),
            Arc::new(OutputSynthesizer::new()),
        );
        (service, dir)
    }

    #[test]
    fn test_banner() {
        let (service, _dir) = service("hi");
        assert_eq!(service.banner().message, "NEXUS Pentest LLM API v1.0");
    }

    #[tokio::test]
    async fn test_create_session_defaults_name() {
        let (service, _dir) = service("hi");
        let created = service.create_session(None).await.unwrap();
        assert_eq!(created.name, DEFAULT_SESSION_NAME);

        let named = service
            .create_session(Some("Recon".to_string()))
            .await
            .unwrap();
        assert_eq!(named.name, "Recon");

        let list = service.list_sessions().await.unwrap();
        assert_eq!(list.sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_chat_then_history_and_delete() {
        let (service, _dir) = service("Running recon.\nEXECUTE_TOOL: whois example.com");
        let session = service.create_session(None).await.unwrap();

        let response = service
            .chat(&ChatRequest {
                session_id: session.id.clone(),
                message: "look up example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.tool_calls.as_ref().map(|c| c.len()), Some(1));

        let history = service.chat_history(&session.id).await.unwrap();
        let roles: Vec<Role> = history.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);

        let listed = service.list_sessions().await.unwrap();
        assert_eq!(listed.sessions[0].message_count, 2);

        let ack = service.delete_session(&session.id).await.unwrap();
        assert_eq!(ack.status, "deleted");
        assert!(service.chat_history(&session.id).await.unwrap().messages.is_empty());
        assert!(service.list_sessions().await.unwrap().sessions.is_empty());
    }

    #[tokio::test]
    async fn test_execute_tool_and_list_executions() {
        let (service, _dir) = service("hi");
        let request = ToolInvocationRequest {
            tool_name: "nmap".to_string(),
            parameters: serde_json::json!({"target": "10.0.0.5"})
                .as_object()
                .cloned()
                .unwrap(),
            session_id: "s1".to_string(),
        };
        let response = service.execute_tool(request).await.unwrap();
        assert_eq!(response.status, ExecutionStatus::Success);

        let list = service.executions("s1").await.unwrap();
        assert_eq!(list.executions.len(), 1);
        assert_eq!(list.executions[0].tool_name, "nmap");
    }

    #[test]
    fn test_tools_listing_serializes_categories() {
        let (service, _dir) = service("hi");
        let json = serde_json::to_value(service.tools()).unwrap();
        assert_eq!(json["categories"][0], "network");
        assert_eq!(json["tools"]["network"][0]["id"], "nmap");
    }

    #[tokio::test]
    async fn test_sandbox_operations_use_configured_root() {
        let (service, dir) = service("hi");
        service.init_sandbox().await.unwrap();
        assert!(dir.path().join("sandbox/README.txt").is_file());

        let listing = service.list_files("/").await;
        assert!(listing.is_success());
        let names: Vec<String> = listing
            .items
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(
            names,
            vec!["README.txt", "results", "scans", "scripts", "wordlists"]
        );
    }
}
