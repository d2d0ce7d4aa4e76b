use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use mchat::{ChatError, ChatHooks, TurnPhase};
use mcommon::SessionId;
use mtooling::{ToolError, ToolExecutionHooks};

/// Swallows panics raised by the wrapped chat hooks.
pub struct SafeChatHooks<H> {
    inner: H,
}

impl<H> SafeChatHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatHooks for SafeChatHooks<H>
where
    H: ChatHooks,
{
    fn on_turn_start(&self, session_id: &SessionId, attachments: usize, tool_sources: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_start(session_id, attachments, tool_sources)
        }));
    }

    fn on_phase_transition(&self, session_id: &SessionId, from: TurnPhase, to: TurnPhase) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_phase_transition(session_id, from, to)
        }));
    }

    fn on_backend_call(&self, session_id: &SessionId, backend: &str, depth: usize, streaming: bool) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_backend_call(session_id, backend, depth, streaming)
        }));
    }

    fn on_turn_complete(&self, session_id: &SessionId, backend_calls: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_complete(session_id, backend_calls, elapsed)
        }));
    }

    fn on_turn_failure(&self, session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(session_id, error, elapsed)
        }));
    }
}

/// Swallows panics raised by the wrapped tool execution hooks.
pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolExecutionHooks for SafeToolHooks<H>
where
    H: ToolExecutionHooks,
{
    fn on_execution_start(&self, tool_name: &str, args_json: &str, context: Option<&str>) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_name, args_json, context)
        }));
    }

    fn on_execution_success(&self, tool_name: &str, output: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_success(tool_name, output, elapsed)
        }));
    }

    fn on_execution_failure(&self, tool_name: &str, error: &ToolError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_failure(tool_name, error, elapsed)
        }));
    }
}
