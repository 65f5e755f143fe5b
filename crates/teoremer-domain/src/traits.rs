//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! All queries are evaluated eagerly: implementations return owned values,
//! never cursors.

use std::collections::BTreeMap;

use crate::{
    DraftId, DraftItem, DraftStatus, Endorsement, FinalId, FinalItem, FinalStatus, ItemType,
    MediaId, MediaItem, NewDraft, NewSource, RefNode, SourceId, User, UserId, ValidationEntry,
    ValidationId, ValidationTarget,
};

/// Store errors that single out violated uniqueness or reference constraints
///
/// Callers treat such failures as a lost race rather than an I/O problem.
pub trait IntegrityError {
    /// Whether this failure is a constraint violation
    fn is_integrity_violation(&self) -> bool;
}

/// Trait for storing and retrieving items, media and users
///
/// Implemented by the infrastructure layer (teoremer-store)
pub trait ItemStore {
    /// Error type for store operations
    type Error;

    /// Run `f` as one atomic unit of work
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`. The
    /// outer `Result` reports failures of the transaction itself; the inner
    /// one is whatever `f` produced. Concurrent units of work on the same
    /// store must serialize.
    fn atomically<T, E, F>(&mut self, f: F) -> Result<Result<T, E>, Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<T, E>;

    /// Register a new user
    fn create_user(&mut self, name: &str) -> Result<User, Self::Error>;

    /// Get a user by ID
    fn get_user(&self, id: UserId) -> Result<Option<User>, Self::Error>;

    /// Get a user by name
    fn find_user(&self, name: &str) -> Result<Option<User>, Self::Error>;

    /// List all users ordered by name
    fn list_users(&self) -> Result<Vec<User>, Self::Error>;

    /// Create a draft in status Draft
    fn create_draft(&mut self, draft: NewDraft) -> Result<DraftItem, Self::Error>;

    /// Get a draft by ID
    fn get_draft(&self, id: DraftId) -> Result<Option<DraftItem>, Self::Error>;

    /// Change a draft's status; returns false if the draft does not exist
    fn set_draft_status(&mut self, id: DraftId, status: DraftStatus) -> Result<bool, Self::Error>;

    /// Replace a draft's body; returns false if the draft does not exist
    fn set_draft_body(&mut self, id: DraftId, body: &str) -> Result<bool, Self::Error>;

    /// Delete a draft and its draft validations; returns false if absent
    fn delete_draft(&mut self, id: DraftId) -> Result<bool, Self::Error>;

    /// Query drafts matching criteria
    fn query_drafts(&self, query: &DraftQuery) -> Result<Vec<DraftItem>, Self::Error>;

    /// Whether a published item with this id exists with status Final
    fn final_exists(&self, id: &FinalId) -> Result<bool, Self::Error>;

    /// Get a published item by id, whatever its status
    fn get_final(&self, id: &FinalId) -> Result<Option<FinalItem>, Self::Error>;

    /// Publish a draft's content under a freshly assigned id
    ///
    /// Does not delete the draft; callers pair this with [`ItemStore::delete_draft`]
    /// inside [`ItemStore::atomically`].
    fn create_final(&mut self, draft: &DraftItem) -> Result<FinalItem, Self::Error>;

    /// Re-target a draft's validation entries onto the item it became
    ///
    /// Entries keep their id, source, location and recorder; each recorder
    /// is recorded as endorsing their own entry. Returns the number moved.
    fn carry_validations(&mut self, draft: DraftId, item: &FinalId) -> Result<usize, Self::Error>;

    /// Change a published item's status; returns false if absent
    fn set_final_status(&mut self, id: &FinalId, status: FinalStatus) -> Result<bool, Self::Error>;

    /// Query published items matching criteria
    fn query_finals(&self, query: &FinalQuery) -> Result<Vec<FinalItem>, Self::Error>;

    /// Register a media file
    fn add_media(&mut self, media: &MediaItem) -> Result<(), Self::Error>;

    /// Whether an original media file exists under this public id
    fn media_exists(&self, id: &MediaId) -> Result<bool, Self::Error>;

    /// Item counts per type and status
    fn count_items(&self) -> Result<ItemCounts, Self::Error>;
}

/// Trait for bibliographic sources and citation evidence
///
/// Implemented by the infrastructure layer (teoremer-store)
pub trait SourceStore {
    /// Error type for store operations
    type Error;

    /// Store a source; author and editor names are shared across sources
    fn create_source(&mut self, source: NewSource, created_by: UserId) -> Result<RefNode, Self::Error>;

    /// Get a source by ID
    fn get_source(&self, id: SourceId) -> Result<Option<RefNode>, Self::Error>;

    /// List all sources
    fn list_sources(&self) -> Result<Vec<RefNode>, Self::Error>;

    /// All known author and editor names, sorted
    fn list_authors(&self) -> Result<Vec<String>, Self::Error>;

    /// Append a validation entry
    fn add_validation(&mut self, entry: &ValidationEntry) -> Result<(), Self::Error>;

    /// Get a validation entry by ID
    fn get_validation(&self, id: ValidationId) -> Result<Option<ValidationEntry>, Self::Error>;

    /// Entries supporting a target, oldest first
    fn validations_for(&self, target: &ValidationTarget) -> Result<Vec<ValidationEntry>, Self::Error>;

    /// Entries citing a source, oldest first
    fn validations_citing(&self, source: SourceId) -> Result<Vec<ValidationEntry>, Self::Error>;

    /// Record an endorsement; returns false if this user already endorsed it
    fn add_endorsement(&mut self, endorsement: &Endorsement) -> Result<bool, Self::Error>;

    /// Endorsements of an entry, oldest first
    fn endorsements(&self, validation: ValidationId) -> Result<Vec<Endorsement>, Self::Error>;

    /// Store the aggregate trust score of an item
    fn set_item_points(&mut self, item: &FinalId, points: f64) -> Result<(), Self::Error>;

    /// Aggregate trust score of an item, if ever scored
    fn item_points(&self, item: &FinalId) -> Result<Option<f64>, Self::Error>;
}

/// Scoring collaborator notified of new item evidence
///
/// Given a new validation entry, updates the aggregate trust score
/// attributed to the cited item.
pub trait ValidationScorer<S: ?Sized> {
    /// Error type for scoring operations
    type Error;

    /// Recompute scores affected by `entry`
    fn update_validation_points(&mut self, store: &mut S, entry: &ValidationEntry) -> Result<(), Self::Error>;
}

/// Query criteria for retrieving drafts
#[derive(Debug, Clone, Default)]
pub struct DraftQuery {
    /// Filter by item type
    pub itemtype: Option<ItemType>,

    /// Filter by status
    pub status: Option<DraftStatus>,

    /// Filter by author
    pub created_by: Option<UserId>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

/// Query criteria for retrieving published items
#[derive(Debug, Clone, Default)]
pub struct FinalQuery {
    /// Filter by item type
    pub itemtype: Option<ItemType>,

    /// Filter by status
    pub status: Option<FinalStatus>,

    /// Filter by author
    pub created_by: Option<UserId>,

    /// Filter by parent item (proofs of a theorem)
    pub parent: Option<FinalId>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

/// Item counts per type, split by lifecycle stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCounts {
    /// Published items with status Final
    pub finals: BTreeMap<ItemType, usize>,

    /// Drafts in review
    pub in_review: BTreeMap<ItemType, usize>,

    /// Drafts being written
    pub drafts: BTreeMap<ItemType, usize>,

    /// Registered users
    pub users: usize,
}
