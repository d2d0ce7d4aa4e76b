//! Conversational orchestration over chat backends.
//!
//! [`ChatOrchestrator`] drives one user turn at a time: it assembles the outbound
//! request from memory, the new message and its attachments, runs the tool-call loop
//! through [`mtooling::ToolExecutor`], and hands the answer back as a lazy
//! [`ChatStream`] of text fragments.

mod error;
mod hooks;
mod orchestrator;
mod policy;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatHooks, ChatOrchestrator, ChatOrchestratorBuilder,
        ChatPolicy, ChatRequest, ChatStream, ResponseMode, TurnPhase,
    };
    pub use mattach::Attachment;
    pub use mcommon::SessionId;
    pub use mtooling::{
        ExecutionContext, FunctionTool, SerialExecutionContext, Tool, ToolError, ToolRegistry,
        ToolSource,
    };
}

pub use error::{ChatError, ChatErrorKind, TOOL_DEPTH_EXCEEDED_MESSAGE};
pub use hooks::{ChatHooks, NoopChatHooks};
pub use orchestrator::{ChatOrchestrator, ChatOrchestratorBuilder, TOOL_NOT_FOUND_PREFIX};
pub use policy::{ChatPolicy, DEFAULT_MAX_TOOL_DEPTH, DEFAULT_TOOL_TIMEOUT};
pub use types::{ChatRequest, ChatStream, ResponseMode, TurnPhase};
