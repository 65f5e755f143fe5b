//! Trust computation for published items
//!
//! Aggregates citation evidence into a single trust score in [0, 1]:
//! 1. Group validation entries by cited source
//! 2. Weight each source by its endorsements and whether a location was given
//! 3. Combine sources as "probability that at least one source holds"

use std::collections::BTreeMap;

use crate::{SourceId, ValidationEntry};

/// Base weight of a source cited with a location (default: 0.8)
pub const LOCATED_WEIGHT: f64 = 0.8;

/// Base weight of a source cited without a location (default: 0.6)
pub const UNLOCATED_WEIGHT: f64 = 0.6;

/// Weights for trust computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustWeights {
    /// Base weight when at least one entry for the source has a location
    pub located_weight: f64,
    /// Base weight when no entry for the source has a location
    pub unlocated_weight: f64,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            located_weight: LOCATED_WEIGHT,
            unlocated_weight: UNLOCATED_WEIGHT,
        }
    }
}

/// Evidence one source contributes to an item
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvidence {
    /// The cited source
    pub source: SourceId,
    /// Whether any entry pins a location in the source
    pub located: bool,
    /// Endorsements across all entries citing this source
    pub endorsements: usize,
}

/// Group an item's entries by source
///
/// `entries` pairs each validation entry with its endorsement count.
pub fn collect_evidence(entries: &[(ValidationEntry, usize)]) -> Vec<SourceEvidence> {
    let mut by_source: BTreeMap<SourceId, SourceEvidence> = BTreeMap::new();
    for (entry, endorsements) in entries {
        let evidence = by_source.entry(entry.source).or_insert(SourceEvidence {
            source: entry.source,
            located: false,
            endorsements: 0,
        });
        evidence.located |= entry.location.is_some();
        evidence.endorsements += endorsements;
    }
    by_source.into_values().collect()
}

/// Weight of a single source: `base × (1 − 0.5ⁿ)`
///
/// The first endorsement earns half the base weight, each further one
/// halves the remaining gap.
pub fn source_weight(evidence: &SourceEvidence, weights: &TrustWeights) -> f64 {
    let base = if evidence.located {
        weights.located_weight
    } else {
        weights.unlocated_weight
    };
    let endorsements = i32::try_from(evidence.endorsements).unwrap_or(i32::MAX);
    (base * (1.0 - 0.5_f64.powi(endorsements))).clamp(0.0, 1.0)
}

/// Combine per-source weights: `1 − ∏(1 − wᵢ)`
pub fn compute_item_trust(evidence: &[SourceEvidence], weights: &TrustWeights) -> f64 {
    if evidence.is_empty() {
        return 0.0;
    }
    let doubt: f64 = evidence
        .iter()
        .map(|e| 1.0 - source_weight(e, weights))
        .product();
    (1.0 - doubt).clamp(0.0, 1.0)
}
