//! Default scoring collaborator

use std::fmt::Display;

use teoremer_domain::scoring::{collect_evidence, compute_item_trust, TrustWeights};
use teoremer_domain::traits::{SourceStore, ValidationScorer};
use teoremer_domain::{ValidationEntry, ValidationTarget};

use crate::{LedgerError, ScoringConfig};

/// Recomputes an item's trust from all of its evidence
///
/// Each new entry or endorsement triggers a full recomputation for the cited
/// item, so the stored points never drift from the ledger contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsScorer {
    weights: TrustWeights,
}

impl PointsScorer {
    /// Create a scorer with the given weights
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: config.weights(),
        }
    }

    /// Weights in use
    pub fn weights(&self) -> &TrustWeights {
        &self.weights
    }
}

impl<S> ValidationScorer<S> for PointsScorer
where
    S: SourceStore + ?Sized,
    S::Error: Display,
{
    type Error = LedgerError;

    fn update_validation_points(&mut self, store: &mut S, entry: &ValidationEntry) -> Result<(), Self::Error> {
        let ValidationTarget::Final(item) = &entry.target else {
            return Ok(());
        };
        let store_err = |e: S::Error| LedgerError::Store(e.to_string());

        let mut weighted = Vec::new();
        for validation in store.validations_for(&entry.target).map_err(store_err)? {
            let endorsements = store.endorsements(validation.id).map_err(store_err)?.len();
            weighted.push((validation, endorsements));
        }

        let trust = compute_item_trust(&collect_evidence(&weighted), &self.weights);
        store.set_item_points(item, trust).map_err(store_err)?;

        tracing::debug!(final_id = %item, entries = weighted.len(), trust, "item points updated");
        Ok(())
    }
}
