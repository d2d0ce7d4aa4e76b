//! Metrics-based observability hooks for chat turns and tool execution.
//!
//! ```rust
//! use mobserve::MetricsObservabilityHooks;
//! use mtooling::ToolExecutionHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolExecutionHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use mchat::{ChatError, ChatHooks, TurnPhase};
use mcommon::SessionId;
use mtooling::{ToolError, ToolExecutionHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ChatHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _session_id: &SessionId, _attachments: usize, _tool_sources: usize) {
        metrics::counter!("murmur_chat_turn_start_total").increment(1);
    }

    fn on_phase_transition(&self, _session_id: &SessionId, _from: TurnPhase, to: TurnPhase) {
        metrics::counter!(
            "murmur_chat_phase_transition_total",
            "to" => format!("{:?}", to)
        )
        .increment(1);
    }

    fn on_backend_call(&self, _session_id: &SessionId, backend: &str, _depth: usize, streaming: bool) {
        metrics::counter!(
            "murmur_backend_call_total",
            "backend" => backend.to_string(),
            "mode" => if streaming { "streaming" } else { "full_response" }
        )
        .increment(1);
    }

    fn on_turn_complete(&self, _session_id: &SessionId, backend_calls: usize, elapsed: Duration) {
        metrics::counter!("murmur_chat_turn_complete_total").increment(1);
        metrics::histogram!("murmur_chat_backend_calls_per_turn").record(backend_calls as f64);
        metrics::histogram!(
            "murmur_chat_turn_duration_seconds",
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "murmur_chat_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "murmur_chat_turn_duration_seconds",
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ToolExecutionHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_name: &str, _args_json: &str, _context: Option<&str>) {
        metrics::counter!(
            "murmur_tool_execution_start_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
    }

    fn on_execution_success(&self, tool_name: &str, _output: &str, elapsed: Duration) {
        metrics::counter!(
            "murmur_tool_execution_success_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "murmur_tool_execution_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(&self, tool_name: &str, error: &ToolError, elapsed: Duration) {
        metrics::counter!(
            "murmur_tool_execution_failure_total",
            "tool_name" => tool_name.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "murmur_tool_execution_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
