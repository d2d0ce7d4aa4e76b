//! Caller-supplied attachment payloads.

use serde::{Deserialize, Serialize};

use crate::{AttachmentCategory, classify};

/// A file handed in alongside a user message.
///
/// Fields are optional because attachments usually arrive from UI or wire payloads;
/// [`validate_attachment`](crate::validate_attachment) turns a complete one into a
/// [`ValidAttachment`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attachment {
    pub data: Option<Vec<u8>>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl Attachment {
    pub fn new(
        data: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            data: Some(data.into()),
            content_type: Some(content_type.into()),
            file_name: Some(file_name.into()),
        }
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn category(&self) -> AttachmentCategory {
        classify(self.content_type.as_deref())
    }
}

/// Borrowed view of an attachment whose required fields are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidAttachment<'a> {
    pub data: &'a [u8],
    pub content_type: &'a str,
    pub file_name: &'a str,
}

impl ValidAttachment<'_> {
    pub fn category(&self) -> AttachmentCategory {
        classify(Some(self.content_type))
    }
}
