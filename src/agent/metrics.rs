//! Metrics for chat turns, backend calls and tool dispatch
//!
//! # Metrics
//!
//! - `nexus_chat_turns_total`: Counter of completed chat turns
//! - `nexus_backend_latency_seconds`: Histogram of model backend call duration
//! - `nexus_backend_failures_total`: Counter of absorbed backend failures by reason
//! - `nexus_tool_executions_total`: Counter of tool dispatches by tool and status
//!
//! # Examples
//!
//! ```
//! use nexus::agent::metrics::BackendCallMetrics;
//!
//! let metrics = BackendCallMetrics::new("openai");
//! metrics.record_success();
//! ```

use metrics::{histogram, increment_counter};
use std::cell::Cell;
use std::time::Instant;

/// Tracks one model backend call
///
/// Uses interior mutability (Cell) so the outcome can be recorded through
/// a shared reference. A call dropped without an outcome counts as a
/// failure with reason `abandoned`.
#[derive(Debug)]
pub struct BackendCallMetrics {
    provider: &'static str,
    start: Instant,
    recorded: Cell<bool>,
}

impl BackendCallMetrics {
    /// Starts timing a call to `provider`
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Records a call that returned a reply
    pub fn record_success(&self) {
        if self.recorded.replace(true) {
            return;
        }
        histogram!(
            "nexus_backend_latency_seconds",
            self.start.elapsed().as_secs_f64(),
            "provider" => self.provider,
            "outcome" => "ok"
        );
    }

    /// Records a failed or timed-out call
    ///
    /// # Arguments
    ///
    /// * `reason` - Short failure class ("timeout", "provider", "missing_credentials", ...)
    pub fn record_failure(&self, reason: &'static str) {
        if self.recorded.replace(true) {
            return;
        }
        histogram!(
            "nexus_backend_latency_seconds",
            self.start.elapsed().as_secs_f64(),
            "provider" => self.provider,
            "outcome" => "error"
        );
        increment_counter!(
            "nexus_backend_failures_total",
            "provider" => self.provider,
            "reason" => reason
        );
    }

    /// Backend name
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Time since the call started
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for BackendCallMetrics {
    fn drop(&mut self) {
        if !self.recorded.get() {
            self.record_failure("abandoned");
        }
    }
}

/// Records one completed chat turn
pub fn record_chat_turn() {
    increment_counter!("nexus_chat_turns_total");
}

/// Records one tool dispatch
///
/// `tool` should be a catalogued identifier or a fixed placeholder so label
/// cardinality stays bounded.
pub fn record_tool_execution(tool: &str, status: &str) {
    increment_counter!(
        "nexus_tool_executions_total",
        "tool" => tool.to_string(),
        "status" => status.to_string()
    );
}

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this installs the Prometheus
/// exporter on its default listener. Otherwise it does nothing.
///
/// # Examples
///
/// ```
/// use nexus::agent::metrics::init_metrics_exporter;
///
/// init_metrics_exporter();
/// ```
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_metrics_creation() {
        let metrics = BackendCallMetrics::new("ollama");
        assert_eq!(metrics.provider(), "ollama");
        assert!(metrics.elapsed().as_millis() < 1000);
    }

    #[test]
    fn test_record_success_sets_flag() {
        let metrics = BackendCallMetrics::new("openai");
        metrics.record_success();
        assert!(metrics.recorded.get());
    }

    #[test]
    fn test_double_record_prevention() {
        let metrics = BackendCallMetrics::new("openai");
        metrics.record_failure("timeout");
        metrics.record_success();
        assert!(metrics.recorded.get());
    }

    #[test]
    fn test_drop_without_recording() {
        {
            let _metrics = BackendCallMetrics::new("openai");
        }
    }

    #[test]
    fn test_free_recorders_do_not_panic() {
        record_chat_turn();
        record_tool_execution("nmap", "success");
        init_metrics_exporter();
    }
}
