//! Configuration for trust scoring
//!
//! Loaded from the `[scoring]` table of the CLI configuration file.

use serde::{Deserialize, Serialize};
use teoremer_domain::scoring::{TrustWeights, LOCATED_WEIGHT, UNLOCATED_WEIGHT};

use crate::LedgerError;

/// Weights used by [`crate::PointsScorer`]
///
/// # Examples
///
/// ```
/// use teoremer_ledger::ScoringConfig;
///
/// let config = ScoringConfig::default();
/// assert_eq!(config.located_weight, 0.8);
/// assert_eq!(config.unlocated_weight, 0.6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Base weight of a source cited with a location
    /// Default: 0.8
    #[serde(default = "default_located_weight")]
    pub located_weight: f64,

    /// Base weight of a source cited without a location
    /// Default: 0.6
    #[serde(default = "default_unlocated_weight")]
    pub unlocated_weight: f64,
}

fn default_located_weight() -> f64 {
    LOCATED_WEIGHT
}

fn default_unlocated_weight() -> f64 {
    UNLOCATED_WEIGHT
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            located_weight: default_located_weight(),
            unlocated_weight: default_unlocated_weight(),
        }
    }
}

impl ScoringConfig {
    /// Check that both weights are probabilities
    pub fn validate(&self) -> Result<(), LedgerError> {
        for (name, weight) in [
            ("located_weight", self.located_weight),
            ("unlocated_weight", self.unlocated_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(LedgerError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }

    /// Weights for trust computation
    pub fn weights(&self) -> TrustWeights {
        TrustWeights {
            located_weight: self.located_weight,
            unlocated_weight: self.unlocated_weight,
        }
    }
}
