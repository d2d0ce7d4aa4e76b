//! Coarse content categories derived from MIME types.
//!
//! ```rust
//! use mattach::{AttachmentCategory, classify};
//!
//! assert_eq!(classify(Some("image/png")), AttachmentCategory::Image);
//! assert_eq!(classify(Some("application/x-pdf")), AttachmentCategory::Pdf);
//! assert_eq!(classify(None), AttachmentCategory::Unsupported);
//! ```

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentCategory {
    Image,
    Text,
    Pdf,
    Audio,
    Video,
    Unsupported,
}

impl AttachmentCategory {
    /// Categories shipped to the backend as binary data URLs.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Image | Self::Pdf | Self::Audio | Self::Video)
    }
}

impl Display for AttachmentCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Unsupported => "unsupported",
        };

        f.write_str(name)
    }
}

/// Maps a MIME type to its category. Total over all inputs.
pub fn classify(mime_type: Option<&str>) -> AttachmentCategory {
    let Some(mime_type) = mime_type else {
        return AttachmentCategory::Unsupported;
    };

    // parameters such as `; charset=utf-8` do not affect the category
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/pdf" | "application/x-pdf" => AttachmentCategory::Pdf,
        other if other.starts_with("image/") => AttachmentCategory::Image,
        other if other.starts_with("text/") => AttachmentCategory::Text,
        other if other.starts_with("audio/") => AttachmentCategory::Audio,
        other if other.starts_with("video/") => AttachmentCategory::Video,
        _ => AttachmentCategory::Unsupported,
    }
}
