//! Common imports for most murmur applications.

pub use crate::{
    assistant_message, full_response_orchestrator, orchestrator, system_message,
    tool_result_message, traced_orchestrator, user_message,
};
pub use crate::{mm_messages, mm_msg};
pub use crate::{
    Attachment, BackendError, BackendRequest, BackendResponse, BoxFuture, ChatBackend, ChatError,
    ChatErrorKind, ChatHooks, ChatOrchestrator, ChatPolicy, ChatRequest, ChatStream,
    ConversationMemory, ExecutionContext, FunctionTool, Message, ResponseMode, Role,
    SerialExecutionContext, SessionId, StreamEvent, Tool, ToolCall, ToolDefinition, ToolError,
    ToolRegistry, ToolSource, TurnPhase,
};
