//! Unified facade over the murmur workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the engine crates and provides message constructors, macros and
//! orchestrator wiring helpers.

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use mattach;
pub use mbackend;
pub use mchat;
pub use mcommon;
pub use mmemory;
pub use mobserve;
pub use mtooling;

pub use mattach::{
    Attachment, AttachmentCategory, AttachmentError, AttachmentErrorKind, EncodedAttachment,
    classify, encode_attachment,
};
pub use mbackend::{
    BackendError, BackendErrorKind, BackendFuture, BackendRequest, BackendRequestBuilder,
    BackendResponse, BlockingBackendAdapter, BlockingChatClient, BoxedEventStream,
    CallbackBackendAdapter, CallbackChatClient, ChatBackend, ContentPart, FinishReason,
    MediaReference, Message, Role, StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult,
    VecEventStream,
};
pub use mchat::{
    ChatError, ChatErrorKind, ChatHooks, ChatOrchestrator, ChatOrchestratorBuilder, ChatPolicy,
    ChatRequest, ChatStream, NoopChatHooks, ResponseMode, TurnPhase,
};
pub use mcommon::{BoxFuture, MetadataMap, SessionId};
pub use mmemory::{
    ConversationMemory, DEFAULT_MAX_MESSAGES, MemoryError, MemoryErrorKind,
    WindowedConversationMemory,
};
pub use mobserve::{
    MetricsObservabilityHooks, SafeChatHooks, SafeToolHooks, TracingObservabilityHooks,
};
pub use mtooling::{
    ExecutionContext, FunctionTool, NoopToolExecutionHooks, SerialExecutionContext, Tool,
    ToolError, ToolErrorKind, ToolExecutionHooks, ToolFuture, ToolRegistry, ToolSource,
    parse_json_object, parse_json_value, required_string,
};

pub use runtime::{full_response_orchestrator, orchestrator, traced_orchestrator};
pub use util::{assistant_message, system_message, tool_result_message, user_message};
