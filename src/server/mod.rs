//! HTTP layer
//!
//! Thin axum routes under `/api` over [`NexusService`]. Handlers hold no
//! logic of their own; see [`handlers`].

pub mod handlers;

use crate::config::ServerConfig;
use crate::error::{NexusError, Result};
use crate::service::NexusService;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the API router
///
/// # Examples
///
/// ```no_run
/// use nexus::{server, Config, NexusService};
/// use std::sync::Arc;
///
/// let config = Config::default();
/// let cors = config.server.clone();
/// let service = Arc::new(NexusService::from_config(config).unwrap());
/// let app = server::router(service, &cors);
/// ```
pub fn router(service: Arc<NexusService>, server: &ServerConfig) -> Router {
    Router::new()
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route(
            "/api/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route("/api/sessions/:session_id", delete(handlers::delete_session))
        .route("/api/chat", post(handlers::chat))
        .route("/api/chat/history/:session_id", get(handlers::chat_history))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/execute", post(handlers::execute_tool))
        .route(
            "/api/tools/executions/:session_id",
            get(handlers::list_executions),
        )
        .route("/api/files/operation", post(handlers::file_operation))
        .route("/api/files/list", get(handlers::list_files))
        .route("/api/files/init-sandbox", post(handlers::init_sandbox))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&server.cors_origins))
}

/// CORS policy for the configured origins
///
/// `*` allows any origin without credentials. An explicit list allows
/// credentials and mirrors the requested methods and headers.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin: {}", e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Binds the configured address and serves until SIGINT or SIGTERM
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(service: Arc<NexusService>) -> Result<()> {
    let server = service.config().server.clone();
    let app = router(service, &server);

    let listener = TcpListener::bind(&server.bind)
        .await
        .map_err(NexusError::Io)
        .with_context(|| format!("Failed to bind {}", server.bind))?;
    tracing::info!(bind = %server.bind, "NEXUS API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(NexusError::Io)
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
