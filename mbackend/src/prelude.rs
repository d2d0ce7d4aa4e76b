//! Common `mbackend` imports for downstream crates.

pub use crate::{
    BackendError, BackendErrorKind, BackendFuture, BackendRequest, BackendRequestBuilder,
    BackendResponse, BoxedEventStream, ChatBackend, ContentPart, FinishReason, MediaReference,
    Message, Role, StreamEvent, StreamHandler, TokenUsage, ToolCall, ToolDefinition, ToolResult,
    VecEventStream,
};
pub use mcommon::{BoxFuture, MetadataMap};
