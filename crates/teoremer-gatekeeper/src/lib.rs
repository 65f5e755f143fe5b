//! Teoremer Gatekeeper
//!
//! Decides whether a draft may be published.
//!
//! The Gatekeeper runs every check and collects every problem:
//! - Body has contents
//! - Item references point at published items
//! - Media references point at original media files
//!
//! An empty issue list means the draft is publishable. Validation never
//! mutates the store and may be re-run at any time.
//!
//! # Examples
//!
//! ```no_run
//! use teoremer_gatekeeper::PublishValidator;
//!
//! let validator = PublishValidator::new();
//!
//! // Validate a draft before publishing
//! // let issues = validator.validate(&draft, &store)?;
//! ```

#![warn(missing_docs)]

mod error;
mod validator;

pub use error::GatekeeperError;
pub use validator::PublishValidator;
