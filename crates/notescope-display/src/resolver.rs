//! Workspace identity resolution with fallback to the personal workspace.

use std::sync::Arc;

use tracing::{instrument, warn};

use notescope_core::{
    Error, Observable, Result, SelectionState, WorkspaceIdentity, WorkspaceService,
};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The requested workspace exists; the selection already points at it.
    Confirmed(WorkspaceIdentity),
    /// The requested workspace could not be loaded and the personal
    /// workspace was used instead.
    FellBack {
        requested: String,
        identity: WorkspaceIdentity,
    },
}

impl Resolution {
    pub fn identity(&self) -> &WorkspaceIdentity {
        match self {
            Self::Confirmed(identity) | Self::FellBack { identity, .. } => identity,
        }
    }

    /// Workspace id to write back into the selection, if any.
    pub fn fallback_workspace_id(&self) -> Option<&str> {
        match self {
            Self::Confirmed(_) => None,
            Self::FellBack { identity, .. } => Some(&identity.id),
        }
    }

    /// Publish the identity and, after a fallback, point the selection at
    /// the personal workspace.
    pub fn commit(self, current: &Observable<WorkspaceIdentity>, selection: &dyn SelectionState) {
        if let Some(id) = self.fallback_workspace_id() {
            selection.set_workspace_id(id);
        }
        let resolved = match self {
            Self::Confirmed(identity) => identity,
            Self::FellBack { identity, .. } => identity,
        };
        current.set(resolved);
    }
}

/// Resolves a requested workspace id to a confirmed identity. One attempt
/// per lookup, no retries.
pub struct WorkspaceResolver {
    workspaces: Arc<dyn WorkspaceService>,
}

impl WorkspaceResolver {
    pub fn new(workspaces: Arc<dyn WorkspaceService>) -> Self {
        Self { workspaces }
    }

    /// Look up `requested_id`, falling back to the personal workspace.
    ///
    /// Returns [`Error::WorkspaceResolution`] when both lookups fail; the
    /// caller keeps its previous identity in that case.
    #[instrument(skip(self), fields(component = "resolver"))]
    pub async fn resolve(&self, requested_id: &str) -> Result<Resolution> {
        let primary = match self.workspaces.get(requested_id).await {
            Ok(workspace) => {
                return Ok(Resolution::Confirmed(WorkspaceIdentity::new(
                    requested_id,
                    workspace.profile.name,
                )));
            }
            Err(e) => e,
        };

        warn!(
            requested = requested_id,
            error = %primary,
            "Workspace lookup failed, falling back to personal workspace"
        );

        match self.workspaces.get_personal().await {
            Ok(personal) => Ok(Resolution::FellBack {
                requested: requested_id.to_string(),
                identity: WorkspaceIdentity::new(personal.id, personal.profile.name),
            }),
            Err(e) => Err(Error::WorkspaceResolution {
                requested: requested_id.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notescope_core::{
        InMemorySelection, InMemoryWorkspaceService, SelectionSnapshot, Workspace,
    };

    fn service() -> InMemoryWorkspaceService {
        InMemoryWorkspaceService::new()
            .with_workspace(Workspace::new("w1", "Team"))
            .with_personal(Workspace::new("p1", "My Notes"))
    }

    #[tokio::test]
    async fn test_requested_workspace_confirmed() {
        let resolver = WorkspaceResolver::new(Arc::new(service()));

        let resolution = resolver.resolve("w1").await.unwrap();

        assert_eq!(
            resolution,
            Resolution::Confirmed(WorkspaceIdentity::new("w1", "Team"))
        );
        assert!(resolution.fallback_workspace_id().is_none());
    }

    #[tokio::test]
    async fn test_missing_workspace_falls_back_to_personal() {
        let resolver = WorkspaceResolver::new(Arc::new(service()));

        let resolution = resolver.resolve("gone").await.unwrap();

        assert_eq!(resolution.identity(), &WorkspaceIdentity::new("p1", "My Notes"));
        assert_eq!(resolution.fallback_workspace_id(), Some("p1"));
        assert!(matches!(
            resolution,
            Resolution::FellBack { ref requested, .. } if requested == "gone"
        ));
    }

    #[tokio::test]
    async fn test_double_failure_is_explicit_error() {
        let resolver = WorkspaceResolver::new(Arc::new(InMemoryWorkspaceService::new()));

        let err = resolver.resolve("w1").await.unwrap_err();

        match err {
            Error::WorkspaceResolution { requested, reason } => {
                assert_eq!(requested, "w1");
                assert_eq!(reason, "no personal workspace");
            }
            other => panic!("Expected WorkspaceResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_commit_confirmed_leaves_selection_alone() {
        let identity = Observable::new(WorkspaceIdentity::default());
        let selection = InMemorySelection::new(SelectionSnapshot::for_workspace("w1"));
        let rx = selection.subscribe();

        Resolution::Confirmed(WorkspaceIdentity::new("w1", "Team")).commit(&identity, &selection);

        assert_eq!(identity.get().display_name, "Team");
        assert_eq!(selection.workspace_id(), "w1");
        assert!(!rx.has_changed().unwrap(), "no selection write expected");
    }

    #[test]
    fn test_commit_fallback_rewrites_selection() {
        let identity = Observable::new(WorkspaceIdentity::default());
        let selection = InMemorySelection::new(SelectionSnapshot::for_workspace("w1"));

        Resolution::FellBack {
            requested: "w1".to_string(),
            identity: WorkspaceIdentity::new("p1", "My Notes"),
        }
        .commit(&identity, &selection);

        assert_eq!(identity.get(), WorkspaceIdentity::new("p1", "My Notes"));
        assert_eq!(selection.workspace_id(), "p1");
    }
}
