//! Shared backend error kinds and error value helpers.
//!
//! ```rust
//! use mbackend::{BackendError, BackendErrorKind};
//!
//! let error = BackendError::transport("connection reset");
//! assert_eq!(error.kind, BackendErrorKind::Transport);
//! assert_eq!(error.to_string(), "Transport: connection reset");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    InvalidRequest,
    Model,
    Transport,
    Protocol,
    Unavailable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidRequest, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Model, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    /// The backend broke the stream contract, e.g. ended without a completion event.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Protocol, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unavailable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Other, message)
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for BackendError {}
