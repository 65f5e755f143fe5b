//! Integration tests for teoremer-gatekeeper
//!
//! Validation runs against a real in-memory store so references resolve
//! the same way they do at publish time.

use teoremer_domain::traits::ItemStore;
use teoremer_domain::{
    DraftItem, FinalId, FinalStatus, Issue, ItemType, MediaId, MediaItem, MediaKind, NewDraft,
    UserId,
};
use teoremer_gatekeeper::PublishValidator;
use teoremer_store::SqliteStore;

fn setup() -> (SqliteStore, UserId) {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let user = store.create_user("alice").unwrap().id;
    (store, user)
}

fn draft(store: &mut SqliteStore, user: UserId, body: &str) -> DraftItem {
    store
        .create_draft(NewDraft::new(ItemType::Theorem, body, user))
        .unwrap()
}

fn published(store: &mut SqliteStore, user: UserId, itemtype: ItemType) -> FinalId {
    let d = store.create_draft(NewDraft::new(itemtype, "body", user)).unwrap();
    let item = store.create_final(&d).unwrap();
    store.delete_draft(d.id).unwrap();
    item.final_id
}

fn messages(issues: &[Issue]) -> Vec<String> {
    issues.iter().map(|i| i.to_string()).collect()
}

#[test]
fn test_reference_to_missing_item() {
    let (mut store, user) = setup();
    let d = draft(&mut store, user, "See item #T42");

    let issues = PublishValidator::new().validate(&d, &store).unwrap();
    assert_eq!(messages(&issues), vec!["Reference to non-existing item 'T42'"]);
}

#[test]
fn test_reference_to_existing_item() {
    let (mut store, user) = setup();
    let def = published(&mut store, user, ItemType::Definition);
    let d = draft(&mut store, user, &format!("Every [group@{}] is a monoid.", def));

    let issues = PublishValidator::new().validate(&d, &store).unwrap();
    assert!(issues.is_empty());
}

#[test]
fn test_reference_to_suspended_item() {
    let (mut store, user) = setup();
    let def = published(&mut store, user, ItemType::Definition);
    store.set_final_status(&def, FinalStatus::Suspended).unwrap();
    let d = draft(&mut store, user, &format!("By [@{}].", def));

    let issues = PublishValidator::new().validate(&d, &store).unwrap();
    assert_eq!(issues, vec![Issue::MissingItem(def)]);
}

#[test]
fn test_media_must_be_original() {
    let (mut store, user) = setup();
    let figure = MediaId::new("M3").unwrap();
    store
        .add_media(&MediaItem {
            public_id: figure.clone(),
            path: "m3_small.png".to_string(),
            kind: MediaKind::Thumbnail,
        })
        .unwrap();
    let d = draft(&mut store, user, "As pictured [figure!M3].");

    let validator = PublishValidator::new();
    assert_eq!(
        messages(&validator.validate(&d, &store).unwrap()),
        vec!["Reference to non-existing media 'M3'"]
    );

    store
        .add_media(&MediaItem {
            public_id: figure,
            path: "m3.png".to_string(),
            kind: MediaKind::Original,
        })
        .unwrap();
    assert!(validator.validate(&d, &store).unwrap().is_empty());
}

#[test]
fn test_all_checks_run_in_order() {
    let (mut store, user) = setup();
    let d = draft(&mut store, user, "[!M1] [@T9] [@D2] [!M0] [@T9]");

    let issues = PublishValidator::new().validate(&d, &store).unwrap();
    assert_eq!(
        messages(&issues),
        vec![
            "Reference to non-existing item 'D2'",
            "Reference to non-existing item 'T9'",
            "Reference to non-existing media 'M0'",
            "Reference to non-existing media 'M1'",
        ]
    );
}

#[test]
fn test_references_in_math_ignored() {
    let (mut store, user) = setup();
    let d = draft(&mut store, user, "Let $[a@T1]$ be given and $$[b!M1]$$.");

    let issues = PublishValidator::new().validate(&d, &store).unwrap();
    assert!(issues.is_empty());
}

#[test]
fn test_unpaired_dollar_does_not_hide_references() {
    let (mut store, user) = setup();
    let d = draft(&mut store, user, "It costs $5. See [@T99]");

    let issues = PublishValidator::new().validate(&d, &store).unwrap();
    assert_eq!(messages(&issues), vec!["Reference to non-existing item 'T99'"]);
}

#[test]
fn test_revalidation_is_idempotent() {
    let (mut store, user) = setup();
    let d = draft(&mut store, user, "See [@T5] and [!M5]");

    let validator = PublishValidator::new();
    let first = validator.validate(&d, &store).unwrap();
    let second = validator.validate(&d, &store).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(store.get_draft(d.id).unwrap().is_some());
}

#[test]
fn test_validate_body_without_draft() {
    let (store, _) = setup();
    let issues = PublishValidator::new().validate_body("", &store).unwrap();
    assert_eq!(issues, vec![Issue::NoContents]);
}
