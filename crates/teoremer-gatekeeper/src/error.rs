//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Store error during validation
    #[error("Store error: {0}")]
    Store(String),
}
