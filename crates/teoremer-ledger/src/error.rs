//! Error types for ledger operations

use thiserror::Error;

/// Errors that can occur while recording or scoring evidence
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Target, source or validation absent, or not visible to the actor
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user already endorsed this validation
    #[error("Already endorsed: {0}")]
    DuplicateEndorsement(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Scoring collaborator failed
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
