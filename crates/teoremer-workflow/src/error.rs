//! Error types for lifecycle transitions

use thiserror::Error;

/// Errors that can occur during workflow operations
///
/// A transition that is merely blocked by validation is not an error; see
/// [`crate::Transition::Blocked`].
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Item absent or not visible to the actor
    #[error("Not found: {0}")]
    NotFound(String),

    /// Draft shape rejected before storage
    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// A concurrent publish got there first
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
}
