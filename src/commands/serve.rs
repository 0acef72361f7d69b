//! `nexus serve`

use crate::config::Config;
use crate::error::Result;
use crate::server;
use crate::service::NexusService;
use std::sync::Arc;

/// Handle `nexus serve`
///
/// Builds the service context and runs the HTTP API until shutdown.
pub async fn handle_serve(config: Config) -> Result<()> {
    let service = Arc::new(NexusService::from_config(config)?);
    server::serve(service).await
}
