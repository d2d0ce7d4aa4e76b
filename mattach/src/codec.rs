//! Attachment validation, text decoding, and data URL encoding.
//!
//! ```rust
//! use mattach::{format_text_attachment, to_data_url};
//!
//! assert_eq!(to_data_url(b"", "image/png"), "data:image/png;base64,");
//! assert_eq!(
//!     format_text_attachment("doc.txt", "Hello World"),
//!     "\n<attachment filename=\"doc.txt\">\nHello World\n</attachment>\n"
//! );
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::{Attachment, AttachmentCategory, AttachmentError, ValidAttachment};

/// Decodes attachment bytes as UTF-8.
///
/// Strict decoding rejects malformed input; lenient decoding substitutes U+FFFD for
/// every invalid sequence and never fails.
pub fn decode_text(bytes: &[u8], file_name: &str, strict: bool) -> Result<String, AttachmentError> {
    if !strict {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }

    std::str::from_utf8(bytes)
        .map(ToString::to_string)
        .map_err(|err| {
            AttachmentError::encoding(format!(
                "failed to decode text attachment '{file_name}': invalid UTF-8 at byte {}",
                err.valid_up_to()
            ))
        })
}

pub fn to_data_url(bytes: &[u8], content_type: &str) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Wraps decoded text for inline inclusion in the user message. Content is inserted
/// verbatim.
pub fn format_text_attachment(file_name: &str, content: &str) -> String {
    format!("\n<attachment filename=\"{file_name}\">\n{content}\n</attachment>\n")
}

/// Checks the attachment itself, then its content type, its data and its file name.
pub fn validate_attachment(
    attachment: Option<&Attachment>,
) -> Result<ValidAttachment<'_>, AttachmentError> {
    let attachment =
        attachment.ok_or_else(|| AttachmentError::invalid("Attachment must not be null"))?;

    let content_type = attachment
        .content_type
        .as_deref()
        .ok_or_else(|| AttachmentError::invalid("Attachment content type must not be null"))?;

    let data = attachment
        .data
        .as_deref()
        .ok_or_else(|| AttachmentError::invalid("Attachment data must not be null"))?;

    let file_name = attachment
        .file_name
        .as_deref()
        .ok_or_else(|| AttachmentError::invalid("Attachment file name must not be null"))?;

    Ok(ValidAttachment {
        data,
        content_type,
        file_name,
    })
}

/// How an attachment travels to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedAttachment {
    /// Decoded text already wrapped by [`format_text_attachment`].
    InlineText(String),
    Media {
        category: AttachmentCategory,
        content_type: String,
        file_name: String,
        data_url: String,
    },
    Dropped {
        file_name: String,
        content_type: String,
    },
}

pub fn encode_attachment(
    attachment: &Attachment,
    strict: bool,
) -> Result<EncodedAttachment, AttachmentError> {
    let valid = validate_attachment(Some(attachment))?;

    let encoded = match valid.category() {
        AttachmentCategory::Text => {
            let content = decode_text(valid.data, valid.file_name, strict)?;
            EncodedAttachment::InlineText(format_text_attachment(valid.file_name, &content))
        }
        AttachmentCategory::Unsupported => EncodedAttachment::Dropped {
            file_name: valid.file_name.to_string(),
            content_type: valid.content_type.to_string(),
        },
        category => EncodedAttachment::Media {
            category,
            content_type: valid.content_type.to_string(),
            file_name: valid.file_name.to_string(),
            data_url: to_data_url(valid.data, valid.content_type),
        },
    };

    Ok(encoded)
}
