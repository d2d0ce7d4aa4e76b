//! Attachment validation and decoding errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentErrorKind {
    Invalid,
    Encoding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentError {
    pub kind: AttachmentErrorKind,
    pub message: String,
}

impl AttachmentError {
    pub fn new(kind: AttachmentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(AttachmentErrorKind::Invalid, message)
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(AttachmentErrorKind::Encoding, message)
    }
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for AttachmentError {}
