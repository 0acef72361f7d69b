//! Tool execution log
//!
//! Every simulated tool run is bracketed by the execution log: a `running`
//! record is written first, the output is synthesized, and the same record
//! is then moved to its terminal status with the output attached.

use crate::agent::metrics::record_tool_execution;
use crate::catalog::ToolCatalog;
use crate::error::Result;
use crate::storage::{
    ExecutionLogStore, SortOrder, ToolExecutionRecord, ToolExecutionResponse,
    ToolInvocationRequest,
};
use crate::synth::OutputSynthesizer;

use std::sync::Arc;

/// Metric label used for tools outside the catalog
const UNCATALOGUED_LABEL: &str = "uncatalogued";

/// Dispatches simulated tool runs and keeps their log
pub struct ToolExecutionLog {
    store: Arc<dyn ExecutionLogStore>,
    synthesizer: Arc<OutputSynthesizer>,
    catalog: ToolCatalog,
    history_limit: usize,
}

impl ToolExecutionLog {
    /// Creates an execution log over `store`
    ///
    /// `history_limit` bounds [`ToolExecutionLog::history`].
    pub fn new(
        store: Arc<dyn ExecutionLogStore>,
        synthesizer: Arc<OutputSynthesizer>,
        catalog: ToolCatalog,
        history_limit: usize,
    ) -> Self {
        Self {
            store,
            synthesizer,
            catalog,
            history_limit,
        }
    }

    /// Runs one tool invocation and records it
    ///
    /// Unknown tools are not an error; they get the generic transcript.
    ///
    /// # Errors
    ///
    /// Returns `NexusError::Storage` if the record cannot be written or
    /// moved to its terminal status.
    pub async fn dispatch(&self, request: ToolInvocationRequest) -> Result<ToolExecutionResponse> {
        tracing::info!(
            session_id = %request.session_id,
            tool = %request.tool_name,
            "Dispatching tool"
        );

        let record = ToolExecutionRecord::running(&request);
        self.store.insert(&record).await?;

        let result = self
            .synthesizer
            .synthesize(&request.tool_name, &request.parameters);

        self.store
            .update_status(&record.id, result.status, &result.output)
            .await?;

        let label = match self.catalog.get(&request.tool_name) {
            Some(entry) => entry.id,
            None => UNCATALOGUED_LABEL,
        };
        record_tool_execution(label, result.status.as_str());
        tracing::debug!(
            execution_id = %record.id,
            status = %result.status,
            "Tool execution recorded"
        );

        Ok(ToolExecutionResponse {
            tool_name: request.tool_name,
            status: result.status,
            output: result.output,
            execution_time: result.elapsed_seconds,
        })
    }

    /// Most recent execution records for a session, newest first
    pub async fn history(&self, session_id: &str) -> Result<Vec<ToolExecutionRecord>> {
        self.store
            .query_executions(session_id, self.history_limit, SortOrder::Descending)
            .await
    }
}
