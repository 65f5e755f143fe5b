//! Teoremer Ledger
//!
//! Bibliographic sources and the evidence that they support published items.
//!
//! The ledger provides:
//! - Source registration with shared author and editor names
//! - Append-only validation entries against items and drafts
//! - Endorsements, at most one per user and entry
//! - Trust scoring through a pluggable [`ValidationScorer`]
//!
//! # Scoring
//!
//! [`PointsScorer`] groups an item's entries by source. Each source weighs
//! `base × (1 − 0.5ⁿ)` for `n` endorsements, where `base` depends on whether a
//! location was given. Sources combine as `1 − ∏(1 − w)`.
//!
//! ```toml
//! [scoring]
//! located_weight = 0.8
//! unlocated_weight = 0.6
//! ```
//!
//! [`ValidationScorer`]: teoremer_domain::traits::ValidationScorer

#![warn(missing_docs)]

mod config;
mod error;
mod ledger;
mod scorer;

pub use config::ScoringConfig;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use scorer::PointsScorer;
