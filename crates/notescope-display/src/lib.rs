//! # notescope-display
//!
//! Paginated note display engine for notescope.
//!
//! This crate provides:
//! - Workspace identity resolution with fallback to the personal workspace
//! - Tag-selection reconciliation against a workspace's current tags
//! - Filtered note search split into fixed-size pages
//! - A reload engine that publishes results, fetching state and errors as
//!   observable values, discarding results of superseded reloads
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use notescope_display::{DisplayConfig, DisplayEngine, InMemorySelection};
//!
//! let engine = DisplayEngine::new(
//!     DisplayConfig::from_env(),
//!     workspaces,
//!     search,
//!     Arc::new(InMemorySelection::default()),
//! )?;
//!
//! engine.trigger_reload_with_tag_refresh()?;
//! let mut fetching = engine.subscribe_fetching();
//! while *fetching.borrow_and_update() {
//!     fetching.changed().await?;
//! }
//! let first_page = engine.get_page(0);
//! ```

pub mod config;
pub mod engine;
pub mod paginator;
pub mod resolver;
pub mod tags;

// Re-export core types
pub use notescope_core::*;

pub use config::DisplayConfig;
pub use engine::{DisplayEngine, DisplayEvent, ReloadKind, ReloadOutcome, ReloadTicket};
pub use paginator::{PagedResults, SearchPaginator};
pub use resolver::{Resolution, WorkspaceResolver};
pub use tags::{reconcile_with, TagReconciler, TagSelection};
