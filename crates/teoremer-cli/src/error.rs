//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error(transparent)]
    Store(#[from] teoremer_store::StoreError),

    /// Lifecycle error
    #[error(transparent)]
    Workflow(#[from] teoremer_workflow::WorkflowError),

    /// Citation ledger error
    #[error(transparent)]
    Ledger(#[from] teoremer_ledger::LedgerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A transition was refused
    #[error("Transition blocked by {0} issue(s)")]
    Blocked(usize),

    /// Named user does not exist
    #[error("Unknown user '{0}'. Use 'user add' first.")]
    UnknownUser(String),

    /// No acting user given
    #[error("No user selected. Pass --as <name> or set 'user' in the config file.")]
    NoUser,
}
