//! Publish validation logic

use std::fmt::Display;

use teoremer_domain::traits::ItemStore;
use teoremer_domain::{BodyScanner, DraftItem, Issue};

use crate::GatekeeperError;

/// The Gatekeeper validates drafts before publishing
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishValidator;

impl PublishValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a draft against the publishing rules
    ///
    /// # Arguments
    ///
    /// * `draft` - The draft to validate
    /// * `store` - The item store used to resolve references
    ///
    /// # Returns
    ///
    /// Every blocking issue found; empty when the draft may be published
    pub fn validate<S: ItemStore>(
        &self,
        draft: &DraftItem,
        store: &S,
    ) -> Result<Vec<Issue>, GatekeeperError>
    where
        S::Error: Display,
    {
        let issues = self.validate_body(&draft.body, store)?;
        tracing::debug!(draft_id = %draft.id, issues = issues.len(), "draft validated");
        Ok(issues)
    }

    /// Validate raw body text; checks are independent of each other
    pub fn validate_body<S: ItemStore>(&self, body: &str, store: &S) -> Result<Vec<Issue>, GatekeeperError>
    where
        S::Error: Display,
    {
        let mut issues = Vec::new();

        // 1. Contents
        if body.trim().is_empty() {
            issues.push(Issue::NoContents);
        }

        let scan = BodyScanner::new(body);

        // 2. Item references
        for id in scan.item_refs() {
            let exists = store
                .final_exists(id)
                .map_err(|e| GatekeeperError::Store(format!("Failed to look up item {}: {}", id, e)))?;
            if !exists {
                issues.push(Issue::MissingItem(id.clone()));
            }
        }

        // 3. Media references
        for id in scan.media_refs() {
            let exists = store
                .media_exists(id)
                .map_err(|e| GatekeeperError::Store(format!("Failed to look up media {}: {}", id, e)))?;
            if !exists {
                issues.push(Issue::MissingMedia(id.clone()));
            }
        }

        Ok(issues)
    }
}
