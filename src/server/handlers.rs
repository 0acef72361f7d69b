//! Route handlers
//!
//! Every handler delegates to [`NexusService`]. Faults that reach this layer
//! are persistence or configuration faults and become `500` with a
//! `{"detail": ...}` body.

use crate::agent::ChatResponse;
use crate::service::{
    Banner, CatalogListing, ChatHistory, ChatRequest, DeleteAck, ExecutionList, NexusService,
    SessionCreated, SessionList,
};
use crate::storage::{ToolExecutionResponse, ToolInvocationRequest};
use crate::tools::{FileOperation, FileOperationResult, SandboxInitResult};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::sync::Arc;

type AppState = State<Arc<NexusService>>;

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = format!("{:#}", self.0);
        tracing::error!(error = %detail, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": detail })),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Query string of `POST /api/sessions`
#[derive(Debug, Deserialize)]
pub struct CreateSessionParams {
    pub name: Option<String>,
}

/// Query string of `GET /api/files/list`
#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    #[serde(default = "default_list_path")]
    pub path: String,
}

fn default_list_path() -> String {
    "/".to_string()
}

/// `GET /api/`
pub async fn root(State(service): AppState) -> Json<Banner> {
    Json(service.banner())
}

/// `POST /api/sessions?name=...`
pub async fn create_session(
    State(service): AppState,
    Query(params): Query<CreateSessionParams>,
) -> ApiResult<SessionCreated> {
    Ok(Json(service.create_session(params.name).await?))
}

/// `GET /api/sessions`
pub async fn list_sessions(State(service): AppState) -> ApiResult<SessionList> {
    Ok(Json(service.list_sessions().await?))
}

/// `DELETE /api/sessions/:session_id`
pub async fn delete_session(
    State(service): AppState,
    Path(session_id): Path<String>,
) -> ApiResult<DeleteAck> {
    Ok(Json(service.delete_session(&session_id).await?))
}

/// `POST /api/chat`
pub async fn chat(
    State(service): AppState,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    Ok(Json(service.chat(&request).await?))
}

/// `GET /api/chat/history/:session_id`
pub async fn chat_history(
    State(service): AppState,
    Path(session_id): Path<String>,
) -> ApiResult<ChatHistory> {
    Ok(Json(service.chat_history(&session_id).await?))
}

/// `GET /api/tools`
pub async fn list_tools(State(service): AppState) -> Json<CatalogListing> {
    Json(service.tools())
}

/// `POST /api/tools/execute`
pub async fn execute_tool(
    State(service): AppState,
    Json(request): Json<ToolInvocationRequest>,
) -> ApiResult<ToolExecutionResponse> {
    Ok(Json(service.execute_tool(request).await?))
}

/// `GET /api/tools/executions/:session_id`
pub async fn list_executions(
    State(service): AppState,
    Path(session_id): Path<String>,
) -> ApiResult<ExecutionList> {
    Ok(Json(service.executions(&session_id).await?))
}

/// `POST /api/files/operation`
pub async fn file_operation(
    State(service): AppState,
    Json(op): Json<FileOperation>,
) -> Json<FileOperationResult> {
    Json(service.file_operation(&op).await)
}

/// `GET /api/files/list?path=/`
pub async fn list_files(
    State(service): AppState,
    Query(params): Query<ListFilesParams>,
) -> Json<FileOperationResult> {
    Json(service.list_files(&params.path).await)
}

/// `POST /api/files/init-sandbox`
pub async fn init_sandbox(State(service): AppState) -> ApiResult<SandboxInitResult> {
    Ok(Json(service.init_sandbox().await?))
}
