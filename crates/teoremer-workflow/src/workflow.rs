//! Draft lifecycle state machine

use std::fmt::Display;

use teoremer_domain::traits::{IntegrityError, ItemStore};
use teoremer_domain::{
    Action, CreatorPolicy, DraftId, DraftItem, DraftStatus, FinalId, FinalItem, FinalStatus,
    Issue, ItemType, NewDraft, PermissionCheck, Subject, UserId,
};
use teoremer_gatekeeper::PublishValidator;

use crate::WorkflowError;

/// Result of a transition request
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The draft changed status
    Moved(DraftItem),
    /// The draft was published and removed
    Published(FinalItem),
    /// The draft was deleted
    Deleted(DraftId),
    /// Nothing changed; every reason is listed
    Blocked(Vec<Issue>),
}

impl Transition {
    /// Whether the transition was refused
    pub fn is_blocked(&self) -> bool {
        matches!(self, Transition::Blocked(_))
    }

    /// Blocking issues, empty on success
    pub fn issues(&self) -> &[Issue] {
        match self {
            Transition::Blocked(issues) => issues,
            _ => &[],
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Transition::Moved(_) => "moved",
            Transition::Published(_) => "published",
            Transition::Deleted(_) => "deleted",
            Transition::Blocked(_) => "blocked",
        }
    }
}

/// Convert a store failure, keeping lost races distinguishable
fn store_error<E: Display + IntegrityError>(e: E) -> WorkflowError {
    if e.is_integrity_violation() {
        WorkflowError::IntegrityViolation(e.to_string())
    } else {
        WorkflowError::Store(e.to_string())
    }
}

fn draft_not_found(id: DraftId) -> WorkflowError {
    WorkflowError::NotFound(format!("Draft {} not found", id))
}

/// Governs draft transitions behind permission and validity gates
///
/// Every transition runs inside one store transaction, so the checks and
/// the writes they guard observe the same state.
///
/// # Examples
///
/// ```no_run
/// use teoremer_domain::{ItemType, NewDraft, UserId};
/// use teoremer_store::SqliteStore;
/// use teoremer_workflow::Workflow;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("teoremer.db")?;
/// let workflow = Workflow::default_policy();
/// let author = UserId::from_value(1);
///
/// let draft = workflow.create_draft(&mut store, NewDraft::new(ItemType::Definition, "A set ...", author))?;
/// let outcome = workflow.to_final(&mut store, author, draft.id)?;
/// for issue in outcome.issues() {
///     println!("{}", issue);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Workflow<P = CreatorPolicy> {
    permissions: P,
    gatekeeper: PublishValidator,
}

impl Workflow<CreatorPolicy> {
    /// Create a workflow where authors own their drafts
    pub fn default_policy() -> Self {
        Self::new(CreatorPolicy)
    }
}

impl<P: PermissionCheck> Workflow<P> {
    /// Create a workflow with the given capability check
    pub fn new(permissions: P) -> Self {
        Self {
            permissions,
            gatekeeper: PublishValidator::new(),
        }
    }

    /// The capability check in use
    pub fn permissions(&self) -> &P {
        &self.permissions
    }

    /// Fetch a draft the actor may act on; absent and forbidden look alike
    fn load_draft<S>(&self, store: &S, actor: UserId, id: DraftId, action: Action) -> Result<DraftItem, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        store
            .get_draft(id)
            .map_err(store_error)?
            .filter(|draft| self.permissions.can(actor, action, Subject::Draft(draft)))
            .ok_or_else(|| draft_not_found(id))
    }

    /// Start a new draft
    ///
    /// Proofs must name a published theorem as parent; nothing else may
    /// carry a parent.
    pub fn create_draft<S>(&self, store: &mut S, draft: NewDraft) -> Result<DraftItem, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        match (&draft.parent, draft.itemtype.has_parent()) {
            (None, true) => {
                return Err(WorkflowError::InvalidDraft(
                    "A proof must name the theorem it proves".to_string(),
                ))
            }
            (Some(_), false) => {
                return Err(WorkflowError::InvalidDraft(format!(
                    "A {} cannot have a parent",
                    draft.itemtype
                )))
            }
            _ => {}
        }

        let created = store
            .atomically(|tx| -> Result<DraftItem, WorkflowError> {
                if let Some(parent) = &draft.parent {
                    let theorem = tx
                        .get_final(parent)
                        .map_err(store_error)?
                        .filter(|f| f.itemtype == ItemType::Theorem && f.status == FinalStatus::Final);
                    if theorem.is_none() {
                        return Err(WorkflowError::NotFound(format!("Theorem {} not found", parent)));
                    }
                }
                tx.create_draft(draft).map_err(store_error)
            })
            .map_err(store_error)??;

        tracing::info!(
            draft_id = %created.id,
            actor = %created.created_by,
            itemtype = %created.itemtype,
            "draft created"
        );
        Ok(created)
    }

    /// Replace the body of a draft
    pub fn edit_body<S>(&self, store: &mut S, actor: UserId, id: DraftId, body: &str) -> Result<DraftItem, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        let edited = store
            .atomically(|tx| -> Result<DraftItem, WorkflowError> {
                self.load_draft(&*tx, actor, id, Action::Edit)?;
                if !tx.set_draft_body(id, body).map_err(store_error)? {
                    return Err(draft_not_found(id));
                }
                self.load_draft(&*tx, actor, id, Action::View)
            })
            .map_err(store_error)??;

        tracing::info!(draft_id = %id, actor = %actor, "draft edited");
        Ok(edited)
    }

    /// Read a draft the actor may view
    pub fn view_draft<S>(&self, store: &S, actor: UserId, id: DraftId) -> Result<DraftItem, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        self.load_draft(store, actor, id, Action::View)
    }

    /// Read a published item the actor may view
    pub fn view_final<S>(&self, store: &S, actor: UserId, id: &FinalId) -> Result<FinalItem, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        store
            .get_final(id)
            .map_err(store_error)?
            .filter(|item| self.permissions.can(actor, Action::View, Subject::Final(item)))
            .ok_or_else(|| WorkflowError::NotFound(format!("Item {} not found", id)))
    }

    /// Run the publish checks without changing anything
    pub fn check<S>(&self, store: &S, actor: UserId, id: DraftId) -> Result<Vec<Issue>, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        let draft = self.load_draft(store, actor, id, Action::View)?;
        self.gatekeeper
            .validate(&draft, store)
            .map_err(|e| WorkflowError::Store(e.to_string()))
    }

    /// Review → Draft
    pub fn to_draft<S>(&self, store: &mut S, actor: UserId, id: DraftId) -> Result<Transition, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        self.move_to(store, actor, id, DraftStatus::Draft, Action::ToDraft)
    }

    /// Draft → Review
    pub fn to_review<S>(&self, store: &mut S, actor: UserId, id: DraftId) -> Result<Transition, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        self.move_to(store, actor, id, DraftStatus::Review, Action::ToReview)
    }

    fn move_to<S>(
        &self,
        store: &mut S,
        actor: UserId,
        id: DraftId,
        target: DraftStatus,
        action: Action,
    ) -> Result<Transition, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        let outcome = store
            .atomically(|tx| -> Result<Transition, WorkflowError> {
                let mut draft = self.load_draft(&*tx, actor, id, action)?;
                if draft.status == target {
                    return Ok(Transition::Blocked(vec![Issue::AlreadyInStatus(target)]));
                }
                if !tx.set_draft_status(id, target).map_err(store_error)? {
                    return Err(draft_not_found(id));
                }
                draft.status = target;
                Ok(Transition::Moved(draft))
            })
            .map_err(store_error)??;

        tracing::info!(
            draft_id = %id,
            actor = %actor,
            action = action.as_str(),
            outcome = outcome.label(),
            "transition"
        );
        Ok(outcome)
    }

    /// Draft or Review → published
    ///
    /// On success the draft is gone and a final item exists under a fresh
    /// id. Citations recorded against the draft move to the new item; its
    /// trust score is left for the ledger to recompute. When validation
    /// finds issues nothing changes. If another caller
    /// publishes the same draft first, this one fails with
    /// [`WorkflowError::NotFound`] or [`WorkflowError::IntegrityViolation`].
    pub fn to_final<S>(&self, store: &mut S, actor: UserId, id: DraftId) -> Result<Transition, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        let outcome = store
            .atomically(|tx| -> Result<Transition, WorkflowError> {
                let draft = self.load_draft(&*tx, actor, id, Action::ToFinal)?;
                let issues = self
                    .gatekeeper
                    .validate(&draft, &*tx)
                    .map_err(|e| WorkflowError::Store(e.to_string()))?;
                if !issues.is_empty() {
                    return Ok(Transition::Blocked(issues));
                }

                let item = tx.create_final(&draft).map_err(store_error)?;
                tx.carry_validations(id, &item.final_id).map_err(store_error)?;
                if !tx.delete_draft(id).map_err(store_error)? {
                    return Err(WorkflowError::IntegrityViolation(format!(
                        "Draft {} disappeared while publishing",
                        id
                    )));
                }
                Ok(Transition::Published(item))
            })
            .map_err(store_error)??;

        match &outcome {
            Transition::Published(item) => tracing::info!(
                draft_id = %id,
                actor = %actor,
                final_id = %item.final_id,
                outcome = outcome.label(),
                "transition"
            ),
            _ => tracing::info!(
                draft_id = %id,
                actor = %actor,
                issues = outcome.issues().len(),
                outcome = outcome.label(),
                "transition"
            ),
        }
        Ok(outcome)
    }

    /// Remove a draft; only its creator may
    pub fn delete<S>(&self, store: &mut S, actor: UserId, id: DraftId) -> Result<Transition, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        let outcome = store
            .atomically(|tx| -> Result<Transition, WorkflowError> {
                let draft = self.load_draft(&*tx, actor, id, Action::Delete)?;
                if draft.created_by != actor {
                    return Err(draft_not_found(id));
                }
                if !tx.delete_draft(id).map_err(store_error)? {
                    return Err(draft_not_found(id));
                }
                Ok(Transition::Deleted(id))
            })
            .map_err(store_error)??;

        tracing::info!(draft_id = %id, actor = %actor, outcome = outcome.label(), "transition");
        Ok(outcome)
    }

    /// Suspend or reinstate a published item
    ///
    /// This is an operator action outside the draft lifecycle; it carries
    /// no capability check.
    pub fn set_final_status<S>(
        &self,
        store: &mut S,
        actor: UserId,
        id: &FinalId,
        status: FinalStatus,
    ) -> Result<FinalItem, WorkflowError>
    where
        S: ItemStore,
        S::Error: Display + IntegrityError,
    {
        let item = store
            .atomically(|tx| -> Result<FinalItem, WorkflowError> {
                let mut item = tx
                    .get_final(id)
                    .map_err(store_error)?
                    .ok_or_else(|| WorkflowError::NotFound(format!("Item {} not found", id)))?;
                tx.set_final_status(id, status).map_err(store_error)?;
                item.status = status;
                Ok(item)
            })
            .map_err(store_error)??;

        tracing::warn!(final_id = %id, actor = %actor, status = %status, "final status changed");
        Ok(item)
    }
}
