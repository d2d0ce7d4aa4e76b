//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use mattach::{AttachmentError, AttachmentErrorKind};
use mbackend::BackendError;
use mmemory::MemoryError;
use mtooling::{ToolError, ToolErrorKind};

pub const TOOL_DEPTH_EXCEEDED_MESSAGE: &str = "Maximum tool execution depth exceeded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Encoding,
    Backend,
    ToolDepthExceeded,
    Tooling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Encoding, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Backend, message)
    }

    pub fn tool_depth_exceeded() -> Self {
        Self::new(ChatErrorKind::ToolDepthExceeded, TOOL_DEPTH_EXCEEDED_MESSAGE)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<BackendError> for ChatError {
    fn from(value: BackendError) -> Self {
        ChatError::backend(value.to_string())
    }
}

impl From<AttachmentError> for ChatError {
    fn from(value: AttachmentError) -> Self {
        match value.kind {
            AttachmentErrorKind::Invalid => ChatError::invalid_request(value.message),
            AttachmentErrorKind::Encoding => ChatError::encoding(value.message),
        }
    }
}

impl From<ToolError> for ChatError {
    fn from(value: ToolError) -> Self {
        match value.kind {
            ToolErrorKind::InvalidDefinition => ChatError::invalid_request(value.message),
            _ => ChatError::tooling(value.to_string()),
        }
    }
}

impl From<MemoryError> for ChatError {
    fn from(value: MemoryError) -> Self {
        ChatError::invalid_request(value.message)
    }
}
