//! Teoremer Workflow
//!
//! The draft lifecycle: Draft ⇄ Review → published, or deleted.
//!
//! # Overview
//!
//! The [`Workflow`] is responsible for:
//! - **Drafting**: creating drafts and editing their bodies
//! - **Review**: moving drafts between Draft and Review
//! - **Publishing**: running the publish checks and turning a draft into a
//!   final item with a fresh public id
//! - **Deletion**: removing drafts on behalf of their creator
//!
//! Every request is gated by a [`teoremer_domain::PermissionCheck`]. An actor
//! who may not act on a draft gets the same `NotFound` as for a draft that
//! does not exist.
//!
//! ## Lifecycle
//!
//! | From | Request | To |
//! |------|---------|----|
//! | Draft | `to_review` | Review |
//! | Review | `to_draft` | Draft |
//! | Draft or Review | `to_final` | published (draft removed) |
//! | Draft or Review | `delete` | gone |
//!
//! Refused requests return [`Transition::Blocked`] with every reason listed
//! and leave the store untouched.
//!
//! # Usage
//!
//! ```no_run
//! use teoremer_domain::traits::ItemStore;
//! use teoremer_domain::{ItemType, NewDraft};
//! use teoremer_store::SqliteStore;
//! use teoremer_workflow::{Transition, Workflow};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("teoremer.db")?;
//! let author = store.create_user("euclid")?.id;
//! let workflow = Workflow::default_policy();
//!
//! let draft = workflow.create_draft(
//!     &mut store,
//!     NewDraft::new(ItemType::Definition, "A *point* is that which has no part.", author),
//! )?;
//! workflow.to_review(&mut store, author, draft.id)?;
//!
//! match workflow.to_final(&mut store, author, draft.id)? {
//!     Transition::Published(item) => println!("Published as {}", item.final_id),
//!     Transition::Blocked(issues) => issues.iter().for_each(|i| println!("{}", i)),
//!     _ => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod workflow;

pub use error::WorkflowError;
pub use workflow::{Transition, Workflow};
