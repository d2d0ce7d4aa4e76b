//! Orchestrator wiring helpers.

use std::sync::Arc;

use crate::{
    ChatBackend, ChatError, ChatOrchestrator, ResponseMode, SafeChatHooks, SafeToolHooks,
    TracingObservabilityHooks,
};

/// Streaming orchestrator with default policy and windowed memory.
pub fn orchestrator(backend: Arc<dyn ChatBackend>) -> Result<ChatOrchestrator, ChatError> {
    ChatOrchestrator::builder(backend).build()
}

pub fn full_response_orchestrator(
    backend: Arc<dyn ChatBackend>,
) -> Result<ChatOrchestrator, ChatError> {
    ChatOrchestrator::builder(backend)
        .response_mode(ResponseMode::FullResponse)
        .build()
}

/// Streaming orchestrator that reports turns and tool executions through `tracing`.
/// Panics raised by the hooks never reach the turn.
pub fn traced_orchestrator(
    backend: Arc<dyn ChatBackend>,
) -> Result<ChatOrchestrator, ChatError> {
    ChatOrchestrator::builder(backend)
        .hooks(Arc::new(SafeChatHooks::new(TracingObservabilityHooks)))
        .tool_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)))
        .build()
}
