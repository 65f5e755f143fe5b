//! Blocking issues reported by transitions

use std::fmt;

use crate::{DraftStatus, FinalId, MediaId};

/// A human-readable reason a transition cannot proceed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Issue {
    /// Body is empty or whitespace only
    NoContents,

    /// Body references an item that is not published
    MissingItem(FinalId),

    /// Body references media that does not exist as an original
    MissingMedia(MediaId),

    /// The draft is already in the requested status
    AlreadyInStatus(DraftStatus),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::NoContents => f.write_str("No contents"),
            Issue::MissingItem(id) => write!(f, "Reference to non-existing item '{}'", id),
            Issue::MissingMedia(id) => write!(f, "Reference to non-existing media '{}'", id),
            Issue::AlreadyInStatus(status) => write!(f, "Item is already in {}", status),
        }
    }
}
