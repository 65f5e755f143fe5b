//! Command implementations.

pub mod draft;
pub mod item;
pub mod media;
pub mod source;
pub mod stats;
pub mod user;

pub use self::draft::execute_draft;
pub use self::item::execute_item;
pub use self::media::execute_media;
pub use self::source::execute_source;
pub use self::stats::execute_stats;
pub use self::user::execute_user;

use std::path::Path;

use teoremer_domain::traits::ItemStore;
use teoremer_domain::{FinalId, UserId};
use teoremer_ledger::{Ledger, ScoringConfig};
use teoremer_store::SqliteStore;
use teoremer_workflow::Workflow;

use crate::error::{CliError, Result};

/// An open knowledge base and the user acting on it.
pub struct Session {
    /// Backing store
    pub store: SqliteStore,
    /// Draft lifecycle rules
    pub workflow: Workflow,
    /// Citation ledger
    pub ledger: Ledger,
    user: Option<String>,
}

impl Session {
    /// Open the database at `path`, creating it if needed.
    pub fn open(path: &Path, scoring: &ScoringConfig, user: Option<String>) -> Result<Self> {
        let store = SqliteStore::new(path)?;
        Ok(Self::with_store(store, scoring, user))
    }

    /// Wrap an already opened store.
    pub fn with_store(store: SqliteStore, scoring: &ScoringConfig, user: Option<String>) -> Self {
        Self {
            store,
            workflow: Workflow::default_policy(),
            ledger: Ledger::from_config(scoring),
            user,
        }
    }

    /// Name of the acting user, if one was selected.
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Resolve the acting user.
    pub fn actor(&self) -> Result<UserId> {
        let name = self.user.as_deref().ok_or(CliError::NoUser)?;
        self.resolve_user(name)
    }

    /// Look up a user id by name.
    pub fn resolve_user(&self, name: &str) -> Result<UserId> {
        self.store
            .find_user(name)?
            .map(|u| u.id)
            .ok_or_else(|| CliError::UnknownUser(name.to_string()))
    }
}

pub(crate) fn parse_final_id(id: &str) -> Result<FinalId> {
    FinalId::new(id.trim()).map_err(CliError::InvalidInput)
}

/// Read a body from the argument or a file.
pub(crate) fn read_body(body: Option<String>, file: Option<String>) -> Result<String> {
    match (body, file) {
        (Some(body), _) => Ok(body),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Err(CliError::InvalidInput(
            "Provide the body as an argument or with --file".to_string(),
        )),
    }
}
