//! Media assets referenced from item bodies

use std::fmt;

/// Public identifier of a media entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaId(String);

impl MediaId {
    /// Create a MediaId
    ///
    /// # Errors
    /// Returns error if the id is empty or contains non-word characters
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("Invalid media id: '{}'", value));
        }
        Ok(Self(value))
    }

    /// Get the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant of a stored media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// The uploaded original; the only kind bodies may reference
    Original,

    /// A derived, scaled-down rendition
    Thumbnail,
}

impl MediaKind {
    /// Single-letter storage code ('O', 'T')
    pub fn code(&self) -> char {
        match self {
            MediaKind::Original => 'O',
            MediaKind::Thumbnail => 'T',
        }
    }

    /// Parse from a storage code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'O' => Some(MediaKind::Original),
            'T' => Some(MediaKind::Thumbnail),
            _ => None,
        }
    }
}

/// A stored media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Public id of the owning media entry
    pub public_id: MediaId,

    /// Storage path relative to the media root
    pub path: String,

    /// Original or derived
    pub kind: MediaKind,
}
