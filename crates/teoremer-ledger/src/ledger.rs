//! Citation ledger: sources, validation entries and endorsements

use std::fmt::Display;

use teoremer_domain::traits::{ItemStore, SourceStore, ValidationScorer};
use teoremer_domain::{
    current_timestamp, Action, CreatorPolicy, Endorsement, FinalId, NewSource, PermissionCheck,
    RefNode, SourceId, Subject, UserId, ValidationEntry, ValidationId, ValidationTarget,
};

use crate::{LedgerError, PointsScorer, ScoringConfig};

fn store_error<E: Display>(e: E) -> LedgerError {
    LedgerError::Store(e.to_string())
}

/// Append-only record of which sources support which items
///
/// Entries are never updated or removed through the ledger. Entries against
/// published items feed the scoring collaborator `C`; entries against
/// drafts are kept as notes and do not score.
///
/// # Examples
///
/// ```no_run
/// use teoremer_domain::{FinalId, NewSource, UserId, ValidationTarget};
/// use teoremer_ledger::{Ledger, ScoringConfig};
/// use teoremer_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("teoremer.db")?;
/// let mut ledger = Ledger::from_config(&ScoringConfig::default());
/// let user = UserId::from_value(1);
///
/// let mut book = NewSource::new("book");
/// book.title = Some("Elements".to_string());
/// let source = ledger.create_source(&mut store, user, book)?;
///
/// let target = ValidationTarget::Final(FinalId::new("T1")?);
/// ledger.record(&mut store, target, source.id, user, Some("Book I, Prop. 47"))?;
/// # Ok(())
/// # }
/// ```
pub struct Ledger<C = PointsScorer, P = CreatorPolicy> {
    scorer: C,
    permissions: P,
}

impl Ledger<PointsScorer, CreatorPolicy> {
    /// Ledger with the default scorer and policy
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(PointsScorer::new(config), CreatorPolicy)
    }
}

impl<C, P: PermissionCheck> Ledger<C, P> {
    /// Create a ledger with a scoring collaborator and capability check
    pub fn new(scorer: C, permissions: P) -> Self {
        Self { scorer, permissions }
    }

    /// The scoring collaborator
    pub fn scorer(&self) -> &C {
        &self.scorer
    }

    /// Record that `source` supports `target`
    ///
    /// For a published item the recorder's own endorsement is stored with
    /// the entry and the scorer runs exactly once. For a draft only the
    /// entry is stored. A blank location is treated as absent.
    pub fn record<S>(
        &mut self,
        store: &mut S,
        target: ValidationTarget,
        source: SourceId,
        created_by: UserId,
        location: Option<&str>,
    ) -> Result<ValidationEntry, LedgerError>
    where
        S: ItemStore + SourceStore,
        <S as ItemStore>::Error: Display,
        <S as SourceStore>::Error: Display,
        C: ValidationScorer<S>,
        C::Error: Display,
    {
        let Self { scorer, permissions } = self;

        let entry = store
            .atomically(|tx| -> Result<ValidationEntry, LedgerError> {
                authorize(&*permissions, &*tx, created_by, &target)?;
                if tx.get_source(source).map_err(store_error)?.is_none() {
                    return Err(LedgerError::NotFound(format!("{} not found", source_label(source))));
                }

                let entry = ValidationEntry::new(target, source, created_by, location, current_timestamp());
                tx.add_validation(&entry).map_err(store_error)?;

                if let ValidationTarget::Final(_) = &entry.target {
                    tx.add_endorsement(&Endorsement {
                        validation: entry.id,
                        created_by,
                        created_at: entry.created_at,
                    })
                    .map_err(store_error)?;
                    scorer
                        .update_validation_points(tx, &entry)
                        .map_err(|e| LedgerError::Scoring(e.to_string()))?;
                }
                Ok(entry)
            })
            .map_err(store_error)??;

        tracing::info!(
            validation_id = %entry.id,
            target = %entry.target,
            source = %entry.source,
            actor = %created_by,
            "validation recorded"
        );
        Ok(entry)
    }

    /// Add `user`'s endorsement to an existing entry on a published item
    pub fn endorse<S>(&mut self, store: &mut S, validation: ValidationId, user: UserId) -> Result<Endorsement, LedgerError>
    where
        S: ItemStore + SourceStore,
        <S as ItemStore>::Error: Display,
        <S as SourceStore>::Error: Display,
        C: ValidationScorer<S>,
        C::Error: Display,
    {
        let Self { scorer, permissions } = self;

        let endorsement = store
            .atomically(|tx| -> Result<Endorsement, LedgerError> {
                let entry = tx
                    .get_validation(validation)
                    .map_err(store_error)?
                    .filter(|e| matches!(e.target, ValidationTarget::Final(_)))
                    .ok_or_else(|| LedgerError::NotFound(format!("Validation {} not found", validation)))?;
                authorize(&*permissions, &*tx, user, &entry.target)?;

                let endorsement = Endorsement {
                    validation,
                    created_by: user,
                    created_at: current_timestamp(),
                };
                if !tx.add_endorsement(&endorsement).map_err(store_error)? {
                    return Err(LedgerError::DuplicateEndorsement(format!(
                        "User {} already endorsed validation {}",
                        user, validation
                    )));
                }
                scorer
                    .update_validation_points(tx, &entry)
                    .map_err(|e| LedgerError::Scoring(e.to_string()))?;
                Ok(endorsement)
            })
            .map_err(store_error)??;

        tracing::info!(validation_id = %validation, actor = %user, "validation endorsed");
        Ok(endorsement)
    }

    /// Register a bibliographic source
    ///
    /// The source and its author and editor links are stored as one unit.
    pub fn create_source<S>(&self, store: &mut S, actor: UserId, source: NewSource) -> Result<RefNode, LedgerError>
    where
        S: ItemStore + SourceStore,
        <S as ItemStore>::Error: Display,
        <S as SourceStore>::Error: Display,
    {
        let node = store
            .atomically(|tx| -> Result<RefNode, LedgerError> {
                tx.create_source(source, actor).map_err(store_error)
            })
            .map_err(store_error)??;
        tracing::info!(source = %node.id, actor = %actor, sourcetype = %node.fields.sourcetype, "source created");
        Ok(node)
    }

    /// Recompute the stored trust of a published item from its entries
    ///
    /// Used after publication, when citations made on the draft have moved
    /// to the new item. Returns the item's points afterwards.
    pub fn rescore<S>(&mut self, store: &mut S, item: &FinalId) -> Result<f64, LedgerError>
    where
        S: ItemStore + SourceStore,
        <S as ItemStore>::Error: Display,
        <S as SourceStore>::Error: Display,
        C: ValidationScorer<S>,
        C::Error: Display,
    {
        let scorer = &mut self.scorer;
        let points = store
            .atomically(|tx| -> Result<f64, LedgerError> {
                let entries = tx
                    .validations_for(&ValidationTarget::Final(item.clone()))
                    .map_err(store_error)?;
                if let Some(entry) = entries.first() {
                    scorer
                        .update_validation_points(tx, entry)
                        .map_err(|e| LedgerError::Scoring(e.to_string()))?;
                }
                Ok(tx.item_points(item).map_err(store_error)?.unwrap_or(0.0))
            })
            .map_err(store_error)??;

        tracing::debug!(final_id = %item, points, "item rescored");
        Ok(points)
    }

    /// Look up a source
    pub fn source<S>(&self, store: &S, id: SourceId) -> Result<RefNode, LedgerError>
    where
        S: SourceStore,
        S::Error: Display,
    {
        store
            .get_source(id)
            .map_err(store_error)?
            .ok_or_else(|| LedgerError::NotFound(format!("{} not found", source_label(id))))
    }

    /// All sources, oldest first
    pub fn sources<S>(&self, store: &S) -> Result<Vec<RefNode>, LedgerError>
    where
        S: SourceStore,
        S::Error: Display,
    {
        store.list_sources().map_err(store_error)
    }

    /// Entries supporting a target, with their endorsement counts
    pub fn entries_for<S>(&self, store: &S, target: &ValidationTarget) -> Result<Vec<(ValidationEntry, usize)>, LedgerError>
    where
        S: SourceStore,
        S::Error: Display,
    {
        with_endorsements(store, store.validations_for(target).map_err(store_error)?)
    }

    /// Entries citing a source, with their endorsement counts
    pub fn entries_citing<S>(&self, store: &S, source: SourceId) -> Result<Vec<(ValidationEntry, usize)>, LedgerError>
    where
        S: SourceStore,
        S::Error: Display,
    {
        with_endorsements(store, store.validations_citing(source).map_err(store_error)?)
    }

    /// Stored trust of a published item; zero when nothing was recorded
    pub fn item_points<S>(&self, store: &S, item: &FinalId) -> Result<f64, LedgerError>
    where
        S: SourceStore,
        S::Error: Display,
    {
        Ok(store.item_points(item).map_err(store_error)?.unwrap_or(0.0))
    }
}

/// Check the actor may attach evidence to the target
fn authorize<P, S>(permissions: &P, store: &S, actor: UserId, target: &ValidationTarget) -> Result<(), LedgerError>
where
    P: PermissionCheck,
    S: ItemStore,
    <S as ItemStore>::Error: Display,
{
    let allowed = match target {
        ValidationTarget::Final(id) => store
            .get_final(id)
            .map_err(store_error)?
            .is_some_and(|item| permissions.can(actor, Action::AddSource, Subject::Final(&item))),
        ValidationTarget::Draft(id) => store
            .get_draft(*id)
            .map_err(store_error)?
            .is_some_and(|draft| permissions.can(actor, Action::AddSource, Subject::Draft(&draft))),
    };
    if allowed {
        Ok(())
    } else {
        Err(LedgerError::NotFound(format!("{} not found", target)))
    }
}

fn source_label(id: SourceId) -> String {
    format!("Source {}", id)
}

fn with_endorsements<S>(store: &S, entries: Vec<ValidationEntry>) -> Result<Vec<(ValidationEntry, usize)>, LedgerError>
where
    S: SourceStore,
    S::Error: Display,
{
    entries
        .into_iter()
        .map(|entry| {
            let count = store.endorsements(entry.id).map_err(store_error)?.len();
            Ok((entry, count))
        })
        .collect()
}
