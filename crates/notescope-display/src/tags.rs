//! Tag-selection reconciliation against a workspace's tag universe.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use notescope_core::{Result, SelectionSnapshot, SelectionState, TagSet, WorkspaceService};

/// The tag selection to write back after reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSelection {
    pub tags: TagSet,
    pub all_selected: bool,
}

impl TagSelection {
    /// Empty selection with the "all" flag off. Never references unknown tags.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Write to the selection holder. Always writes, even when nothing
    /// changed, so its listeners are notified.
    pub fn commit(self, selection: &dyn SelectionState) {
        selection.update_tag_selection(self.tags, self.all_selected);
    }
}

/// Keeps "all tags selected" meaning "every tag that currently exists".
pub struct TagReconciler {
    workspaces: Arc<dyn WorkspaceService>,
}

impl TagReconciler {
    pub fn new(workspaces: Arc<dyn WorkspaceService>) -> Self {
        Self { workspaces }
    }

    /// Fetch the tag universe of `workspace_id` and reconcile the selection
    /// against it. The selection is read after the fetch completes so edits
    /// made while it was in flight are respected. Fetch failures are logged
    /// and yield a cleared selection.
    #[instrument(skip(self, selection), fields(component = "tag_reconciler"))]
    pub async fn reconcile(&self, workspace_id: &str, selection: &dyn SelectionState) -> TagSelection {
        let universe = self.workspaces.get_all_tags(workspace_id).await;
        if let Err(e) = &universe {
            warn!(error = %e, "Tag fetch failed, clearing tag selection");
        }
        let reconciled = reconcile_with(universe, &selection.snapshot());
        debug!(
            tag_count = reconciled.tags.len(),
            all_selected = reconciled.all_selected,
            "Tag selection reconciled"
        );
        reconciled
    }
}

/// Pure reconciliation rule.
///
/// - fetched + all selected: selection becomes the fetched universe
/// - fetched + explicit selection: existing selection kept as-is
/// - fetch failed: cleared
pub fn reconcile_with(universe: Result<Vec<String>>, current: &SelectionSnapshot) -> TagSelection {
    match universe {
        Ok(all_tags) if current.all_tags_selected => TagSelection {
            tags: all_tags.into_iter().collect(),
            all_selected: true,
        },
        Ok(_) => TagSelection {
            tags: current.selected_tags.clone(),
            all_selected: false,
        },
        Err(_) => TagSelection::cleared(),
    }
}
