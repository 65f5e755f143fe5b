//! Teoremer Domain Layer
//!
//! Core model for the Teoremer knowledge base: mathematical definitions,
//! theorems and proofs that move from draft through review to a published,
//! citable final form.
//!
//! ## Key Concepts
//!
//! - **Draft**: an editable, unpublished item
//! - **Final**: an immutable, publicly citable item with a stable public id
//! - **Reference markers**: `[text@ID]` and `[text!ID]` embedded in bodies
//! - **Validation entries**: append-only evidence that a source supports an item
//! - **Endorsements**: users affirming a validation entry, accumulating trust
//!
//! ## Architecture
//!
//! This crate holds pure business logic and the trait boundaries the other
//! crates implement or consume. Storage lives in `teoremer-store`, publishing
//! rules in `teoremer-gatekeeper`, transitions in `teoremer-workflow` and the
//! citation ledger in `teoremer-ledger`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod issue;
pub mod item;
pub mod media;
pub mod permission;
pub mod scanner;
pub mod scoring;
pub mod source;
pub mod traits;
pub mod user;
pub mod validation;

// Re-exports for convenience
pub use issue::Issue;
pub use item::{DraftId, DraftItem, DraftStatus, FinalId, FinalItem, FinalStatus, ItemType, NewDraft};
pub use media::{MediaId, MediaItem, MediaKind};
pub use permission::{Action, CreatorPolicy, PermissionCheck, Subject};
pub use scanner::BodyScanner;
pub use source::{NewSource, RefNode, SourceId};
pub use user::{User, UserId};
pub use validation::{Endorsement, ValidationEntry, ValidationId, ValidationTarget};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current timestamp in seconds since Unix epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
