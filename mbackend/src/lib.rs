//! Backend contract for the murmur orchestration engine.
//!
//! Defines the message model exchanged with a language-model service, the
//! [`ChatBackend`] trait covering full-response and streaming calls, stream event
//! utilities, and adapters for blocking and callback-driven model clients.

mod adapters;
mod backend;
mod error;
mod model;
mod stream;

pub mod prelude;

pub use adapters::{
    BlockingBackendAdapter, BlockingChatClient, CallbackBackendAdapter, CallbackChatClient,
};
pub use backend::{BackendFuture, ChatBackend};
pub use error::{BackendError, BackendErrorKind};
pub use model::{
    BackendRequest, BackendRequestBuilder, BackendResponse, ContentPart, FinishReason,
    MediaReference, Message, Role, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
pub use stream::{
    BackendEventStream, BoxedEventStream, ChannelEventStream, StreamEvent, StreamHandler,
    VecEventStream, stream_channel,
};
