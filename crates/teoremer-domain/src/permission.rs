//! Capability checks
//!
//! Permission grants are resolved outside the core. The core only asks
//! whether an actor may perform an action on a subject.

use crate::{DraftItem, FinalItem, UserId};

/// Actions guarded by a capability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move a review item back to draft
    ToDraft,
    /// Submit a draft for review
    ToReview,
    /// Publish a draft
    ToFinal,
    /// Delete a draft
    Delete,
    /// Read an item
    View,
    /// Change an item's body
    Edit,
    /// Attach source evidence
    AddSource,
}

impl Action {
    /// Get the action name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ToDraft => "to_draft",
            Action::ToReview => "to_review",
            Action::ToFinal => "to_final",
            Action::Delete => "delete",
            Action::View => "view",
            Action::Edit => "edit",
            Action::AddSource => "add_source",
        }
    }

    /// All actions, in display order
    pub const ALL: [Action; 7] = [
        Action::ToDraft,
        Action::ToReview,
        Action::ToFinal,
        Action::AddSource,
        Action::Edit,
        Action::Delete,
        Action::View,
    ];
}

/// The item an action applies to
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// An unpublished item
    Draft(&'a DraftItem),
    /// A published item
    Final(&'a FinalItem),
}

impl Subject<'_> {
    /// Author of the subject
    pub fn created_by(&self) -> UserId {
        match self {
            Subject::Draft(d) => d.created_by,
            Subject::Final(f) => f.created_by,
        }
    }
}

/// Capability check resolved by the permission subsystem
pub trait PermissionCheck {
    /// Whether `actor` may perform `action` on `subject`
    fn can(&self, actor: UserId, action: Action, subject: Subject<'_>) -> bool;
}

impl<F> PermissionCheck for F
where
    F: Fn(UserId, Action, Subject<'_>) -> bool,
{
    fn can(&self, actor: UserId, action: Action, subject: Subject<'_>) -> bool {
        self(actor, action, subject)
    }
}

/// Default policy: authors own their drafts, finals are public
///
/// - On a draft, only its creator may do anything.
/// - On a final, anyone may view it or add sources; nothing else applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatorPolicy;

impl PermissionCheck for CreatorPolicy {
    fn can(&self, actor: UserId, action: Action, subject: Subject<'_>) -> bool {
        match subject {
            Subject::Draft(draft) => draft.created_by == actor,
            Subject::Final(_) => matches!(action, Action::View | Action::AddSource),
        }
    }
}
