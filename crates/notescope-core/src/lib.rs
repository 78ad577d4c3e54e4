//! # notescope-core
//!
//! Core types, traits, and observable state for notescope.
//!
//! This crate provides the data model exchanged with the workspace and note
//! search services, the collaborator traits the display engine is built on,
//! and in-memory implementations of those traits.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod memory;
pub mod models;
pub mod observable;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use memory::{InMemoryNoteSearch, InMemorySelection, InMemoryWorkspaceService};
pub use models::*;
pub use observable::Observable;
pub use traits::*;
