//! Integration tests for teoremer-workflow
//!
//! Full draft lifecycles against SQLite, including two publishers racing
//! on one database file.

use std::io::Write;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use teoremer_domain::traits::{DraftQuery, FinalQuery, ItemStore, SourceStore};
use teoremer_domain::{
    current_timestamp, DraftId, FinalStatus, Issue, ItemType, MediaId, MediaItem, MediaKind,
    NewDraft, NewSource, UserId, ValidationEntry, ValidationTarget,
};
use teoremer_store::SqliteStore;
use teoremer_workflow::{Transition, Workflow, WorkflowError};

fn setup() -> (SqliteStore, UserId) {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let user = store.create_user("noether").unwrap().id;
    (store, user)
}

fn new_draft(store: &mut SqliteStore, workflow: &Workflow, user: UserId, itemtype: ItemType, body: &str) -> DraftId {
    workflow
        .create_draft(store, NewDraft::new(itemtype, body, user))
        .unwrap()
        .id
}

#[test]
fn test_empty_draft_blocked() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut store, &workflow, user, ItemType::Definition, "");

    let outcome = workflow.to_final(&mut store, user, id).unwrap();
    assert_eq!(outcome, Transition::Blocked(vec![Issue::NoContents]));
    assert!(store.get_draft(id).unwrap().is_some());
    assert!(store.query_finals(&FinalQuery::default()).unwrap().is_empty());
}

#[test]
fn test_missing_reference_blocked() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut store, &workflow, user, ItemType::Theorem, "See item #T42");

    let outcome = workflow.to_final(&mut store, user, id).unwrap();
    let messages: Vec<String> = outcome.issues().iter().map(|i| i.to_string()).collect();
    assert_eq!(messages, vec!["Reference to non-existing item 'T42'"]);
    assert!(store.get_draft(id).unwrap().is_some());
}

#[test]
fn test_price_in_body_does_not_hide_reference() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut store, &workflow, user, ItemType::Theorem, "It costs $5. See [@T99]");

    let outcome = workflow.to_final(&mut store, user, id).unwrap();
    assert!(matches!(outcome, Transition::Blocked(_)));
    assert!(store.query_finals(&FinalQuery::default()).unwrap().is_empty());
}

#[test]
fn test_publish_round_trip() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut store, &workflow, user, ItemType::Definition, "valid content");
    workflow.to_review(&mut store, user, id).unwrap();

    let item = match workflow.to_final(&mut store, user, id).unwrap() {
        Transition::Published(item) => item,
        other => panic!("Expected Published, got {:?}", other),
    };
    assert_eq!(item.body, "valid content");
    assert_eq!(item.itemtype, ItemType::Definition);
    assert_eq!(item.created_by, user);
    assert_eq!(item.status, FinalStatus::Final);

    assert!(store.get_draft(id).unwrap().is_none());
    assert_eq!(store.get_final(&item.final_id).unwrap(), Some(item.clone()));

    // The draft is gone; publishing it again cannot succeed
    assert!(matches!(
        workflow.to_final(&mut store, user, id),
        Err(WorkflowError::NotFound(_))
    ));
}

#[test]
fn test_publish_chain_with_references() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();

    let def = new_draft(&mut store, &workflow, user, ItemType::Definition, "A ring is ...");
    let Transition::Published(def) = workflow.to_final(&mut store, user, def).unwrap() else {
        panic!("definition should publish");
    };

    store
        .add_media(&MediaItem {
            public_id: MediaId::new("hasse").unwrap(),
            path: "hasse.svg".to_string(),
            kind: MediaKind::Original,
        })
        .unwrap();

    let body = format!("Every [ring@{}] has a unit. [diagram!hasse]", def.final_id);
    let thm = new_draft(&mut store, &workflow, user, ItemType::Theorem, &body);
    let Transition::Published(thm) = workflow.to_final(&mut store, user, thm).unwrap() else {
        panic!("theorem should publish");
    };

    let proof = workflow
        .create_draft(
            &mut store,
            NewDraft::new(ItemType::Proof, "Obvious.", user).with_parent(thm.final_id.clone()),
        )
        .unwrap();
    let Transition::Published(proof) = workflow.to_final(&mut store, user, proof.id).unwrap() else {
        panic!("proof should publish");
    };
    assert_eq!(proof.parent, Some(thm.final_id.clone()));
    assert_ne!(proof.final_id, thm.final_id);
}

#[test]
fn test_suspended_item_blocks_new_references() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let def = new_draft(&mut store, &workflow, user, ItemType::Definition, "text");
    let Transition::Published(def) = workflow.to_final(&mut store, user, def).unwrap() else {
        panic!("definition should publish");
    };

    let suspended = workflow
        .set_final_status(&mut store, user, &def.final_id, FinalStatus::Suspended)
        .unwrap();
    assert_eq!(suspended.status, FinalStatus::Suspended);

    let thm = new_draft(&mut store, &workflow, user, ItemType::Theorem, &format!("[@{}]", def.final_id));
    let outcome = workflow.to_final(&mut store, user, thm).unwrap();
    assert_eq!(outcome.issues(), &[Issue::MissingItem(def.final_id.clone())]);

    workflow
        .set_final_status(&mut store, user, &def.final_id, FinalStatus::Final)
        .unwrap();
    assert!(matches!(
        workflow.to_final(&mut store, user, thm).unwrap(),
        Transition::Published(_)
    ));
}

#[test]
fn test_delete_draft() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut store, &workflow, user, ItemType::Theorem, "text");

    assert_eq!(workflow.delete(&mut store, user, id).unwrap(), Transition::Deleted(id));
    assert!(store.query_drafts(&DraftQuery::default()).unwrap().is_empty());
    assert!(matches!(
        workflow.delete(&mut store, user, id),
        Err(WorkflowError::NotFound(_))
    ));
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_transitions_emit_events() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let id = new_draft(&mut store, &workflow, user, ItemType::Definition, "text");
        workflow.to_review(&mut store, user, id).unwrap();
        workflow.to_final(&mut store, user, id).unwrap();
    });

    let output = log.contents();
    let transitions: Vec<&str> = output.lines().filter(|l| l.contains("transition")).collect();
    assert_eq!(transitions.len(), 2);
    assert!(transitions[0].contains("moved"));
    assert!(transitions[1].contains("published"));
    assert!(transitions[1].contains("final_id=D1"));
}

#[test]
fn test_publish_keeps_draft_citations() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut store, &workflow, user, ItemType::Theorem, "valid content");

    let mut book = NewSource::new("book");
    book.title = Some("Disquisitiones".to_string());
    let source = store.create_source(book, user).unwrap();
    let entry = ValidationEntry::new(ValidationTarget::Draft(id), source.id, user, Some("Art. 16"), current_timestamp());
    store.add_validation(&entry).unwrap();

    let Transition::Published(item) = workflow.to_final(&mut store, user, id).unwrap() else {
        panic!("draft should publish");
    };

    let target = ValidationTarget::Final(item.final_id.clone());
    let carried = store.get_validation(entry.id).unwrap().unwrap();
    assert_eq!(carried.target, target);
    assert_eq!(carried.location.as_deref(), Some("Art. 16"));
    assert_eq!(carried.created_by, user);

    assert_eq!(store.validations_for(&target).unwrap().len(), 1);
    assert_eq!(store.validations_citing(source.id).unwrap().len(), 1);
    assert!(store.validations_for(&ValidationTarget::Draft(id)).unwrap().is_empty());

    let endorsements = store.endorsements(entry.id).unwrap();
    assert_eq!(endorsements.len(), 1);
    assert_eq!(endorsements[0].created_by, user);
}

#[test]
fn test_deleted_draft_drops_its_citations() {
    let (mut store, user) = setup();
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut store, &workflow, user, ItemType::Theorem, "scratch");
    let source = store.create_source(NewSource::new("article"), user).unwrap();
    let entry = ValidationEntry::new(ValidationTarget::Draft(id), source.id, user, None, current_timestamp());
    store.add_validation(&entry).unwrap();

    workflow.delete(&mut store, user, id).unwrap();
    assert!(store.get_validation(entry.id).unwrap().is_none());
}

#[test]
fn test_concurrent_publish_single_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("teoremer.db");

    let mut setup = SqliteStore::new(&path).unwrap();
    let user = setup.create_user("noether").unwrap().id;
    let workflow = Workflow::default_policy();
    let id = new_draft(&mut setup, &workflow, user, ItemType::Theorem, "valid content");
    drop(setup);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let mut store = SqliteStore::new(&path).unwrap();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let workflow = Workflow::default_policy();
                barrier.wait();
                workflow.to_final(&mut store, user, id)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let published = results
        .iter()
        .filter(|r| matches!(r, Ok(Transition::Published(_))))
        .count();
    assert_eq!(published, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(WorkflowError::NotFound(_)) | Err(WorkflowError::IntegrityViolation(_))
    )));

    let store = SqliteStore::new(&path).unwrap();
    assert_eq!(store.query_finals(&FinalQuery::default()).unwrap().len(), 1);
}
