//! Asset category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse grouping of assets by content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    /// `image/*`.
    Image,
    /// `video/*`.
    Video,
    /// `audio/*`.
    Audio,
    /// Everything else (PDF, office documents, archives).
    Document,
}

impl AssetCategory {
    /// All categories in display order.
    pub const ALL: [AssetCategory; 4] = [Self::Image, Self::Video, Self::Audio, Self::Document];

    /// Derive the category from a MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        let lowered = content_type.trim().to_ascii_lowercase();
        if lowered.starts_with("image/") {
            Self::Image
        } else if lowered.starts_with("video/") {
            Self::Video
        } else if lowered.starts_with("audio/") {
            Self::Audio
        } else {
            Self::Document
        }
    }

    /// Return the category name as stored on type rules.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Document => "Document",
        }
    }

    /// MIME prefix for categories that have one.
    pub fn mime_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some("image/"),
            Self::Video => Some("video/"),
            Self::Audio => Some("audio/"),
            Self::Document => None,
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = assethub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "document" => Ok(Self::Document),
            _ => Err(assethub_core::AppError::validation(format!(
                "Invalid category: '{s}'. Expected one of: Image, Video, Audio, Document"
            ))),
        }
    }
}
