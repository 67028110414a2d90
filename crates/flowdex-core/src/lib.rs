//! Core data model for the Flowdex component reference index.
//!
//! Everything in this crate is pure: value types, reference extraction from
//! loose JSON, and directory-based component classification. No I/O happens
//! here; the host-facing pieces live in `flowdex-index`.

pub mod classify;
pub mod component;
pub mod config;
pub mod extract;
pub mod reference;

// Re-export key types for convenient usage
pub use classify::classify;
pub use component::IndexedComponent;
pub use config::{ConfigError, WorkspaceConfig, CONFIG_FILE_NAME};
pub use extract::extract_reference;
pub use reference::{ComponentKind, ComponentReference, PartialReference};
