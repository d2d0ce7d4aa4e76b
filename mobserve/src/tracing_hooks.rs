//! Tracing-based observability hooks for chat turns and tool execution.
//!
//! ```rust
//! use mobserve::TracingObservabilityHooks;
//! use mchat::ChatHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use mchat::{ChatError, ChatHooks, TurnPhase};
use mcommon::SessionId;
use mtooling::{ToolError, ToolExecutionHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ChatHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, session_id: &SessionId, attachments: usize, tool_sources: usize) {
        tracing::info!(
            phase = "chat",
            event = "turn_start",
            session_id = %session_id,
            attachments,
            tool_sources
        );
    }

    fn on_phase_transition(&self, session_id: &SessionId, from: TurnPhase, to: TurnPhase) {
        tracing::debug!(
            phase = "chat",
            event = "phase_transition",
            session_id = %session_id,
            from = ?from,
            to = ?to
        );
    }

    fn on_backend_call(&self, session_id: &SessionId, backend: &str, depth: usize, streaming: bool) {
        tracing::info!(
            phase = "backend",
            event = "call",
            session_id = %session_id,
            backend,
            tool_depth = depth,
            streaming
        );
    }

    fn on_turn_complete(&self, session_id: &SessionId, backend_calls: usize, elapsed: Duration) {
        tracing::info!(
            phase = "chat",
            event = "turn_complete",
            session_id = %session_id,
            backend_calls,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "chat",
            event = "turn_failure",
            session_id = %session_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ToolExecutionHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_name: &str, args_json: &str, context: Option<&str>) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name,
            args_bytes = args_json.len(),
            context = context.unwrap_or("worker")
        );
    }

    fn on_execution_success(&self, tool_name: &str, output: &str, elapsed: Duration) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name,
            output_bytes = output.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(&self, tool_name: &str, error: &ToolError, elapsed: Duration) {
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
