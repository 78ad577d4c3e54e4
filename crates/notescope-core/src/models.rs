//! Core data models for notescope.
//!
//! These types are shared between the core and display crates and represent
//! the payloads exchanged with the workspace and search services.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

/// A set of tag names. Ordered so snapshots compare and print deterministically.
pub type TagSet = BTreeSet<String>;

// =============================================================================
// WORKSPACE TYPES
// =============================================================================

/// Profile block of a workspace as returned by the workspace service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named collection of notes with its own tag universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(alias = "_id")]
    pub id: String,
    pub profile: WorkspaceProfile,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            profile: WorkspaceProfile {
                name: name.into(),
                description: None,
            },
        }
    }

    /// Display name of the workspace (its profile name).
    pub fn name(&self) -> &str {
        &self.profile.name
    }
}

/// The workspace currently being displayed: a confirmed id plus the name
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceIdentity {
    pub id: String,
    pub display_name: String,
}

impl WorkspaceIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Placeholder identity used before any lookup completes; id and name
    /// are both the sentinel.
    pub fn sentinel(sentinel: &str) -> Self {
        Self::new(sentinel, sentinel)
    }
}

impl Default for WorkspaceIdentity {
    fn default() -> Self {
        Self::sentinel(defaults::PERSONAL_WORKSPACE_SENTINEL)
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Opaque note type tag (e.g. "content", "chat", "template").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteType(String);

impl NoteType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteType {
    fn default() -> Self {
        Self::new(defaults::NOTE_TYPE)
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A note as returned by the search service. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub note_type: NoteType,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning workspace.
    pub workspace_id: String,
    pub created_at_utc: DateTime<Utc>,
}

impl Note {
    pub fn new(
        workspace_id: impl Into<String>,
        note_type: impl Into<NoteType>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            note_type: note_type.into(),
            title: title.into(),
            tags: Vec::new(),
            workspace_id: workspace_id.into(),
            created_at_utc: Utc::now(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// True if the note carries at least one of `tags`.
    pub fn has_any_tag(&self, tags: &TagSet) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

// =============================================================================
// SELECTION TYPES
// =============================================================================

/// Point-in-time copy of the navigation selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub workspace_id: String,
    pub note_type: NoteType,
    /// Free-text query; empty means no query.
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub selected_tags: TagSet,
    pub all_tags_selected: bool,
}

impl SelectionSnapshot {
    pub fn for_workspace(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            ..Self::default()
        }
    }

    pub fn with_note_type(mut self, note_type: impl Into<NoteType>) -> Self {
        self.note_type = note_type.into();
        self
    }

    pub fn with_search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    /// Explicit tag selection; clears the "all tags" flag.
    pub fn with_selected_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_tags = tags.into_iter().map(Into::into).collect();
        self.all_tags_selected = false;
        self
    }

    pub fn with_all_tags_selected(mut self, all: bool) -> Self {
        self.all_tags_selected = all;
        self
    }
}

impl Default for SelectionSnapshot {
    fn default() -> Self {
        Self {
            workspace_id: defaults::PERSONAL_WORKSPACE_SENTINEL.to_string(),
            note_type: NoteType::default(),
            search_query: String::new(),
            selected_tags: TagSet::new(),
            all_tags_selected: true,
        }
    }
}

/// Filters sent to the note search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSearchRequest {
    pub workspace_id: String,
    pub note_type: NoteType,
    pub search_query: String,
    pub tags_to_include: TagSet,
    pub notes_per_page: usize,
}

impl NoteSearchRequest {
    pub fn from_snapshot(snapshot: &SelectionSnapshot, notes_per_page: usize) -> Self {
        Self {
            workspace_id: snapshot.workspace_id.clone(),
            note_type: snapshot.note_type.clone(),
            search_query: snapshot.search_query.clone(),
            tags_to_include: snapshot.selected_tags.clone(),
            notes_per_page,
        }
    }
}

// =============================================================================
// STATUS TYPES
// =============================================================================

/// Loading/error status exposed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStatus {
    pub fetching: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
