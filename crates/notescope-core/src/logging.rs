//! Structured logging field names for notescope.
//!
//! Every `tracing` call in the workspace uses these names for its structured
//! fields so log aggregation can query them uniformly.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Broken invariant, requires attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Reload completions |
//! | DEBUG | Decision points (stale result discarded, refresh skipped) |
//! | TRACE | Per-page detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Component emitting the event.
/// Examples: "resolver", "tag_reconciler", "paginator", "engine"
pub const COMPONENT: &str = "component";

/// Reload generation token.
pub const GENERATION: &str = "generation";

/// Reload kind ("reload", "reload_with_tag_refresh").
pub const RELOAD_KIND: &str = "kind";

/// Newest generation at the time a stale result was discarded.
pub const LATEST_GENERATION: &str = "latest";

/// Reload step at which a stale result was discarded
/// ("resolve", "reconcile", "search").
pub const STAGE: &str = "stage";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Workspace id being displayed or looked up.
pub const WORKSPACE_ID: &str = "workspace_id";

/// Workspace id originally requested before fallback.
pub const REQUESTED_WORKSPACE_ID: &str = "requested";

/// Note type filter.
pub const NOTE_TYPE: &str = "note_type";

/// Free-text search query.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of notes returned by a search.
pub const RESULT_COUNT: &str = "result_count";

/// Number of pages produced by pagination.
pub const PAGE_COUNT: &str = "page_count";

/// Number of tags in a tag universe or selection.
pub const TAG_COUNT: &str = "tag_count";

/// Zero-based page index.
pub const PAGE: &str = "page";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Every field name above, for uniqueness checks.
pub const ALL_FIELDS: &[&str] = &[
    COMPONENT,
    GENERATION,
    RELOAD_KIND,
    LATEST_GENERATION,
    STAGE,
    WORKSPACE_ID,
    REQUESTED_WORKSPACE_ID,
    NOTE_TYPE,
    QUERY,
    DURATION_MS,
    RESULT_COUNT,
    PAGE_COUNT,
    TAG_COUNT,
    PAGE,
    ERROR_MSG,
];
