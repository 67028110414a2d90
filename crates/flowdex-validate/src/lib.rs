//! Workflow document model and cross-reference validation.
//!
//! `document` models the reference-bearing shape of a workflow file as
//! typed serde structs so every slot that can hold a component reference is
//! enumerated at compile time. `validator` resolves those slots against a
//! [`flowdex_index::ComponentIndex`] and reports the ones that cannot be
//! resolved.

pub mod document;
pub mod validator;

pub use document::{StateNode, Transition, WorkflowDocument};
pub use validator::{find_references, validate, ReferenceSite, UnresolvedReference};
