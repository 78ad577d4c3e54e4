//! In-memory implementations of the collaborator traits.
//!
//! Used by tests and demos. The services support injected failures and a
//! fixed artificial latency so callers can exercise error and overlap paths.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use tracing::trace;

use crate::error::{Error, Result};
use crate::models::*;
use crate::observable::Observable;
use crate::traits::{NoteSearchService, SelectionState, WorkspaceService};

// =============================================================================
// SELECTION
// =============================================================================

/// Selection holder backed by an [`Observable`]; every write notifies
/// subscribers, including writes that leave the value unchanged.
#[derive(Debug, Default)]
pub struct InMemorySelection {
    state: Observable<SelectionSnapshot>,
}

impl InMemorySelection {
    pub fn new(initial: SelectionSnapshot) -> Self {
        Self {
            state: Observable::new(initial),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.state.subscribe()
    }

    /// Replace the whole selection (e.g. from a filter editor).
    pub fn replace(&self, snapshot: SelectionSnapshot) {
        self.state.set(snapshot);
    }

    pub fn set_note_type(&self, note_type: impl Into<NoteType>) {
        let note_type = note_type.into();
        self.state.update(|s| s.note_type = note_type);
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.update(|s| s.search_query = query);
    }
}

impl SelectionState for InMemorySelection {
    fn workspace_id(&self) -> String {
        self.state.with(|s| s.workspace_id.clone())
    }

    fn set_workspace_id(&self, workspace_id: &str) {
        self.state
            .update(|s| s.workspace_id = workspace_id.to_string());
    }

    fn note_type(&self) -> NoteType {
        self.state.with(|s| s.note_type.clone())
    }

    fn search_query(&self) -> String {
        self.state.with(|s| s.search_query.clone())
    }

    fn selected_tags(&self) -> TagSet {
        self.state.with(|s| s.selected_tags.clone())
    }

    fn all_tags_selected(&self) -> bool {
        self.state.with(|s| s.all_tags_selected)
    }

    fn update_tag_selection(&self, tags: TagSet, all_selected: bool) {
        self.state.update(|s| {
            s.selected_tags = tags;
            s.all_tags_selected = all_selected;
        });
    }

    fn snapshot(&self) -> SelectionSnapshot {
        self.state.get()
    }
}

// =============================================================================
// WORKSPACE SERVICE
// =============================================================================

/// Workspace service over a fixed map of workspaces and tag universes.
#[derive(Debug, Default)]
pub struct InMemoryWorkspaceService {
    workspaces: RwLock<HashMap<String, Workspace>>,
    tags: RwLock<HashMap<String, Vec<String>>>,
    personal_id: RwLock<Option<String>>,
    tag_failure: RwLock<Option<String>>,
    latency: Duration,
}

impl InMemoryWorkspaceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspaces
            .get_mut()
            .insert(workspace.id.clone(), workspace);
        self
    }

    /// Register `workspace` and mark it as the caller's personal workspace.
    pub fn with_personal(mut self, workspace: Workspace) -> Self {
        *self.personal_id.get_mut() = Some(workspace.id.clone());
        self.with_workspace(workspace)
    }

    pub fn with_tags<I, S>(mut self, workspace_id: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.get_mut().insert(
            workspace_id.to_string(),
            tags.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Remove a workspace, e.g. to simulate it being deleted while viewed.
    pub async fn remove_workspace(&self, id: &str) {
        self.workspaces.write().await.remove(id);
        let mut personal = self.personal_id.write().await;
        if personal.as_deref() == Some(id) {
            *personal = None;
        }
    }

    pub async fn set_tags(&self, workspace_id: &str, tags: Vec<String>) {
        self.tags
            .write()
            .await
            .insert(workspace_id.to_string(), tags);
    }

    /// Make tag lookups fail with `message` until cleared with `None`.
    pub async fn fail_tags(&self, message: Option<String>) {
        *self.tag_failure.write().await = message;
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl WorkspaceService for InMemoryWorkspaceService {
    async fn get(&self, id: &str) -> Result<Workspace> {
        self.simulate_latency().await;
        self.workspaces
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::WorkspaceNotFound(id.to_string()))
    }

    async fn get_personal(&self) -> Result<Workspace> {
        self.simulate_latency().await;
        let personal = self.personal_id.read().await.clone();
        let Some(id) = personal else {
            return Err(Error::Service("no personal workspace".to_string()));
        };
        self.workspaces
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::WorkspaceNotFound(id))
    }

    async fn get_all_tags(&self, workspace_id: &str) -> Result<Vec<String>> {
        self.simulate_latency().await;
        if let Some(message) = self.tag_failure.read().await.clone() {
            return Err(Error::TagFetch(message));
        }
        if !self.workspaces.read().await.contains_key(workspace_id) {
            return Err(Error::WorkspaceNotFound(workspace_id.to_string()));
        }
        Ok(self
            .tags
            .read()
            .await
            .get(workspace_id)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// NOTE SEARCH SERVICE
// =============================================================================

/// Note search over an in-memory list, preserving insertion order.
///
/// Matching rules: same workspace, same note type, title contains the query
/// (case-insensitive) when one is given, and at least one tag in
/// `tags_to_include` when that set is non-empty.
#[derive(Debug, Default)]
pub struct InMemoryNoteSearch {
    notes: RwLock<Vec<Note>>,
    failure: RwLock<Option<String>>,
    latency: Duration,
}

impl InMemoryNoteSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(mut self, notes: impl IntoIterator<Item = Note>) -> Self {
        self.notes.get_mut().extend(notes);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn insert(&self, note: Note) {
        self.notes.write().await.push(note);
    }

    /// Make searches fail with `message` until cleared with `None`.
    pub async fn fail_with(&self, message: Option<String>) {
        *self.failure.write().await = message;
    }

    fn matches(note: &Note, request: &NoteSearchRequest, query: &str) -> bool {
        note.workspace_id == request.workspace_id
            && note.note_type == request.note_type
            && (query.is_empty() || note.title.to_lowercase().contains(query))
            && (request.tags_to_include.is_empty() || note.has_any_tag(&request.tags_to_include))
    }
}

#[async_trait]
impl NoteSearchService for InMemoryNoteSearch {
    async fn find(&self, request: &NoteSearchRequest) -> Result<Vec<Note>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(message) = self.failure.read().await.clone() {
            return Err(Error::Service(message));
        }

        let query = request.search_query.trim().to_lowercase();
        let found: Vec<Note> = self
            .notes
            .read()
            .await
            .iter()
            .filter(|note| Self::matches(note, request, &query))
            .cloned()
            .collect();

        trace!(
            workspace_id = %request.workspace_id,
            result_count = found.len(),
            "In-memory note search"
        );
        Ok(found)
    }
}
