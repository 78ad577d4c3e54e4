//! Centralized default constants for notescope.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Environment variable names for runtime overrides live here too.

// =============================================================================
// PAGINATION
// =============================================================================

/// Number of notes shown per page of search results.
pub const NOTES_PER_PAGE: usize = 10;

// =============================================================================
// WORKSPACE
// =============================================================================

/// Placeholder id and display name used before any workspace lookup has
/// completed.
pub const PERSONAL_WORKSPACE_SENTINEL: &str = "personal";

/// Note type filter applied by a fresh selection.
pub const NOTE_TYPE: &str = "content";

// =============================================================================
// EVENTS
// =============================================================================

/// Buffer capacity of the display event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 64;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides [`NOTES_PER_PAGE`].
pub const ENV_NOTES_PER_PAGE: &str = "NOTESCOPE_NOTES_PER_PAGE";

/// Overrides [`PERSONAL_WORKSPACE_SENTINEL`].
pub const ENV_PERSONAL_SENTINEL: &str = "NOTESCOPE_PERSONAL_SENTINEL";
