//! Core traits for notescope collaborators.
//!
//! The display engine never talks to a network, database, or UI toolkit
//! directly. It is handed implementations of these traits at construction
//! time, which keeps it testable against in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// WORKSPACE SERVICE
// =============================================================================

/// Lookup service for workspaces and their tag universes.
#[async_trait]
pub trait WorkspaceService: Send + Sync {
    /// Fetch a workspace by id.
    async fn get(&self, id: &str) -> Result<Workspace>;

    /// Fetch the caller's personal workspace.
    async fn get_personal(&self) -> Result<Workspace>;

    /// List every tag defined in a workspace.
    async fn get_all_tags(&self, workspace_id: &str) -> Result<Vec<String>>;
}

// =============================================================================
// NOTE SEARCH SERVICE
// =============================================================================

/// Filtered note search. Returns the full ordered match list; pagination is
/// the caller's concern.
#[async_trait]
pub trait NoteSearchService: Send + Sync {
    async fn find(&self, request: &NoteSearchRequest) -> Result<Vec<Note>>;
}

// =============================================================================
// SELECTION STATE
// =============================================================================

/// Navigation/selection holder shared with sibling components (filter
/// editors, navigation).
///
/// Methods take `&self`; implementations provide their own interior
/// mutability and notify their listeners on every write.
pub trait SelectionState: Send + Sync {
    fn workspace_id(&self) -> String;

    fn set_workspace_id(&self, workspace_id: &str);

    fn note_type(&self) -> NoteType;

    fn search_query(&self) -> String;

    fn selected_tags(&self) -> TagSet;

    fn all_tags_selected(&self) -> bool;

    /// Replace the tag selection and the "all tags selected" flag together.
    fn update_tag_selection(&self, tags: TagSet, all_selected: bool);

    /// Point-in-time copy of every field.
    ///
    /// The default reads field by field; implementations holding the whole
    /// snapshot behind one lock should override it to read atomically.
    fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            workspace_id: self.workspace_id(),
            note_type: self.note_type(),
            search_query: self.search_query(),
            selected_tags: self.selected_tags(),
            all_tags_selected: self.all_tags_selected(),
        }
    }
}
