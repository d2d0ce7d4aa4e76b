//! Attachment classification and encoding for outbound user messages.
//!
//! Text attachments are decoded and inlined into the message text; images, PDFs,
//! audio and video travel as base64 data URLs; anything else is dropped.
//!
//! ```rust
//! use mattach::{Attachment, EncodedAttachment, encode_attachment};
//!
//! let notes = Attachment::new(b"remember the milk".to_vec(), "text/plain", "notes.txt");
//! let encoded = encode_attachment(&notes, true).expect("valid text attachment");
//! assert!(matches!(encoded, EncodedAttachment::InlineText(_)));
//! ```

mod category;
mod codec;
mod error;
mod types;

pub use category::{AttachmentCategory, classify};
pub use codec::{
    EncodedAttachment, decode_text, encode_attachment, format_text_attachment, to_data_url,
    validate_attachment,
};
pub use error::{AttachmentError, AttachmentErrorKind};
pub use types::{Attachment, ValidAttachment};
