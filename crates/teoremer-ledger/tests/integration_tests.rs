//! Integration tests for teoremer-ledger

use teoremer_domain::traits::{ItemStore, SourceStore, ValidationScorer};
use teoremer_domain::{
    CreatorPolicy, DraftId, FinalId, ItemType, NewDraft, NewSource, SourceId, UserId,
    ValidationEntry, ValidationId, ValidationTarget,
};
use teoremer_ledger::{Ledger, LedgerError, PointsScorer, ScoringConfig};
use teoremer_store::SqliteStore;

/// Scorer that only counts how often it was asked
#[derive(Default)]
struct CountingScorer {
    calls: Vec<ValidationTarget>,
}

impl ValidationScorer<SqliteStore> for CountingScorer {
    type Error = String;

    fn update_validation_points(&mut self, _store: &mut SqliteStore, entry: &ValidationEntry) -> Result<(), Self::Error> {
        self.calls.push(entry.target.clone());
        Ok(())
    }
}

struct Fixture {
    store: SqliteStore,
    author: UserId,
    reader: UserId,
    theorem: FinalId,
    draft: DraftId,
    source: SourceId,
}

fn fixture() -> Fixture {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let author = store.create_user("hilbert").unwrap().id;
    let reader = store.create_user("klein").unwrap().id;

    let published = store
        .create_draft(NewDraft::new(ItemType::Theorem, "Basis theorem", author))
        .unwrap();
    let theorem = store.create_final(&published).unwrap().final_id;
    store.delete_draft(published.id).unwrap();

    let draft = store
        .create_draft(NewDraft::new(ItemType::Theorem, "Nullstellensatz", author))
        .unwrap()
        .id;

    let mut book = NewSource::new("book");
    book.authors = vec!["David Hilbert".to_string()];
    book.title = Some("Theory of Algebraic Invariants".to_string());
    let source = store.create_source(book, author).unwrap().id;

    Fixture {
        store,
        author,
        reader,
        theorem,
        draft,
        source,
    }
}

#[test]
fn test_final_validation_scores_once() {
    let mut f = fixture();
    let mut ledger = Ledger::new(CountingScorer::default(), CreatorPolicy);

    let entry = ledger
        .record(&mut f.store, ValidationTarget::Final(f.theorem.clone()), f.source, f.author, Some(" p. 12 "))
        .unwrap();
    assert_eq!(entry.location.as_deref(), Some("p. 12"));
    assert_eq!(ledger.scorer().calls, vec![ValidationTarget::Final(f.theorem.clone())]);
    assert_eq!(f.store.endorsements(entry.id).unwrap().len(), 1);
}

#[test]
fn test_draft_validation_does_not_score() {
    let mut f = fixture();
    let mut ledger = Ledger::new(CountingScorer::default(), CreatorPolicy);

    let entry = ledger
        .record(&mut f.store, ValidationTarget::Draft(f.draft), f.source, f.author, Some("   "))
        .unwrap();
    assert_eq!(entry.location, None);
    assert!(ledger.scorer().calls.is_empty());
    assert!(f.store.endorsements(entry.id).unwrap().is_empty());
}

#[test]
fn test_missing_targets_and_sources() {
    let mut f = fixture();
    let mut ledger = Ledger::new(CountingScorer::default(), CreatorPolicy);

    let missing_item = ledger.record(
        &mut f.store,
        ValidationTarget::Final(FinalId::new("T999").unwrap()),
        f.source,
        f.author,
        None,
    );
    assert!(matches!(missing_item, Err(LedgerError::NotFound(_))));

    let missing_source = ledger.record(
        &mut f.store,
        ValidationTarget::Final(f.theorem.clone()),
        SourceId::from_value(999),
        f.author,
        None,
    );
    assert!(matches!(missing_source, Err(LedgerError::NotFound(_))));

    // Another user's draft is not visible
    let foreign_draft = ledger.record(&mut f.store, ValidationTarget::Draft(f.draft), f.source, f.reader, None);
    assert!(matches!(foreign_draft, Err(LedgerError::NotFound(_))));

    assert!(ledger.scorer().calls.is_empty());
    assert!(f
        .store
        .validations_for(&ValidationTarget::Final(f.theorem.clone()))
        .unwrap()
        .is_empty());
}

#[test]
fn test_endorse() {
    let mut f = fixture();
    let mut ledger = Ledger::new(CountingScorer::default(), CreatorPolicy);
    let entry = ledger
        .record(&mut f.store, ValidationTarget::Final(f.theorem.clone()), f.source, f.author, None)
        .unwrap();

    let endorsement = ledger.endorse(&mut f.store, entry.id, f.reader).unwrap();
    assert_eq!(endorsement.created_by, f.reader);
    assert_eq!(ledger.scorer().calls.len(), 2);

    let again = ledger.endorse(&mut f.store, entry.id, f.reader);
    assert!(matches!(again, Err(LedgerError::DuplicateEndorsement(_))));
    let own = ledger.endorse(&mut f.store, entry.id, f.author);
    assert!(matches!(own, Err(LedgerError::DuplicateEndorsement(_))));
    assert_eq!(ledger.scorer().calls.len(), 2);

    let unknown = ledger.endorse(&mut f.store, ValidationId::new(), f.reader);
    assert!(matches!(unknown, Err(LedgerError::NotFound(_))));
}

#[test]
fn test_draft_entries_cannot_be_endorsed() {
    let mut f = fixture();
    let mut ledger = Ledger::new(CountingScorer::default(), CreatorPolicy);
    let entry = ledger
        .record(&mut f.store, ValidationTarget::Draft(f.draft), f.source, f.author, None)
        .unwrap();

    assert!(matches!(
        ledger.endorse(&mut f.store, entry.id, f.author),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn test_points_accumulate() {
    let mut f = fixture();
    let mut ledger = Ledger::from_config(&ScoringConfig::default());
    let target = ValidationTarget::Final(f.theorem.clone());

    assert_eq!(ledger.item_points(&f.store, &f.theorem).unwrap(), 0.0);

    let entry = ledger
        .record(&mut f.store, target.clone(), f.source, f.author, Some("Ch. 1"))
        .unwrap();
    let one = ledger.item_points(&f.store, &f.theorem).unwrap();
    assert!((one - 0.4).abs() < 1e-9);

    ledger.endorse(&mut f.store, entry.id, f.reader).unwrap();
    let two = ledger.item_points(&f.store, &f.theorem).unwrap();
    assert!((two - 0.6).abs() < 1e-9);

    let mut paper = NewSource::new("article");
    paper.title = Some("Über die Theorie der algebraischen Formen".to_string());
    let paper = ledger.create_source(&mut f.store, f.reader, paper).unwrap();
    ledger.record(&mut f.store, target.clone(), paper.id, f.reader, None).unwrap();
    let three = ledger.item_points(&f.store, &f.theorem).unwrap();
    assert!(three > two);
    assert!(three <= 1.0);

    let entries = ledger.entries_for(&f.store, &target).unwrap();
    assert_eq!(entries.len(), 2);
    let endorsed = entries.iter().find(|(e, _)| e.id == entry.id).unwrap();
    assert_eq!(endorsed.1, 2);
    assert_eq!(ledger.entries_citing(&f.store, paper.id).unwrap().len(), 1);
}

#[test]
fn test_custom_weights() {
    let mut f = fixture();
    let config: ScoringConfig = toml::from_str("located_weight = 1.0\nunlocated_weight = 0.2").unwrap();
    let mut ledger = Ledger::new(PointsScorer::new(&config), CreatorPolicy);

    ledger
        .record(&mut f.store, ValidationTarget::Final(f.theorem.clone()), f.source, f.author, None)
        .unwrap();
    let points = ledger.item_points(&f.store, &f.theorem).unwrap();
    assert!((points - 0.1).abs() < 1e-9);
}

#[test]
fn test_sources() {
    let mut f = fixture();
    let ledger = Ledger::from_config(&ScoringConfig::default());

    let node = ledger.source(&f.store, f.source).unwrap();
    assert_eq!(node.fields.title.as_deref(), Some("Theory of Algebraic Invariants"));
    assert!(matches!(
        ledger.source(&f.store, SourceId::from_value(42)),
        Err(LedgerError::NotFound(_))
    ));

    ledger
        .create_source(&mut f.store, f.author, NewSource::new("misc"))
        .unwrap();
    assert_eq!(ledger.sources(&f.store).unwrap().len(), 2);
}

#[test]
fn test_source_with_people_created_together() {
    let mut f = fixture();
    let ledger = Ledger::from_config(&ScoringConfig::default());

    let mut volume = NewSource::new("incollection");
    volume.authors = vec!["Emmy Noether".to_string()];
    volume.editors = vec!["Felix Klein".to_string(), "David Hilbert".to_string()];
    volume.title = Some("Invariante Variationsprobleme".to_string());
    let created = ledger.create_source(&mut f.store, f.reader, volume).unwrap();

    let stored = ledger.source(&f.store, created.id).unwrap();
    assert_eq!(stored.fields.authors, vec!["Emmy Noether".to_string()]);
    assert_eq!(stored.fields.editors.len(), 2);
    assert_eq!(stored.created_by, f.reader);
}

#[test]
fn test_rescore_after_publication() {
    let mut f = fixture();
    let mut ledger = Ledger::from_config(&ScoringConfig::default());

    ledger
        .record(&mut f.store, ValidationTarget::Draft(f.draft), f.source, f.author, Some("ch. 1"))
        .unwrap();
    let draft = f.store.get_draft(f.draft).unwrap().unwrap();
    let item = f.store.create_final(&draft).unwrap().final_id;
    assert_eq!(f.store.carry_validations(f.draft, &item).unwrap(), 1);
    f.store.delete_draft(f.draft).unwrap();

    assert_eq!(ledger.item_points(&f.store, &item).unwrap(), 0.0);
    let points = ledger.rescore(&mut f.store, &item).unwrap();
    assert!((points - 0.4).abs() < 1e-9);
    assert_eq!(ledger.item_points(&f.store, &item).unwrap(), points);

    // Nothing cited, nothing stored
    assert_eq!(ledger.rescore(&mut f.store, &f.theorem).unwrap(), 0.0);
}
