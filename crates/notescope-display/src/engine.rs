//! Display engine: workspace resolution, tag reconciliation and paged search
//! behind two reload triggers.
//!
//! ## States
//!
//! `Idle -> Fetching -> Idle[+error]`. `fetching` turns on synchronously when
//! a reload is triggered and stays on until the latest reload commits.
//!
//! ## Overlapping reloads
//!
//! Each reload takes a generation number. Before writing to shared state
//! (identity, selection, pages, status) a reload checks that its generation
//! is still the latest; otherwise its results are dropped. Older reloads are
//! not cancelled, they run to completion and discard.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use notescope_core::{
    defaults, Error, FetchStatus, Note, NoteSearchService, Observable, Result, SelectionState,
    WorkspaceIdentity, WorkspaceService,
};

use crate::config::DisplayConfig;
use crate::paginator::{PagedResults, SearchPaginator};
use crate::resolver::{Resolution, WorkspaceResolver};
use crate::tags::TagReconciler;

/// Which reload sequence to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadKind {
    /// Resolve workspace, then search.
    Plain,
    /// Resolve workspace, reconcile tags, then search.
    WithTagRefresh,
}

impl ReloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "reload",
            Self::WithTagRefresh => "reload_with_tag_refresh",
        }
    }
}

impl fmt::Display for ReloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation token issued to a reload when it is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    pub generation: u64,
    pub kind: ReloadKind,
}

/// How a reload ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Results were written; carries the status after the write.
    Committed(FetchStatus),
    /// A newer reload started first; nothing from this one was written
    /// after that point.
    Superseded { generation: u64, latest: u64 },
}

impl ReloadOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn status(&self) -> Option<&FetchStatus> {
        match self {
            Self::Committed(status) => Some(status),
            Self::Superseded { .. } => None,
        }
    }
}

/// Events broadcast by the engine, serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum DisplayEvent {
    ReloadStarted {
        generation: u64,
        kind: ReloadKind,
    },
    /// The requested workspace was replaced by the personal workspace.
    WorkspaceFallback {
        requested: String,
        workspace_id: String,
    },
    ReloadCompleted {
        generation: u64,
        kind: ReloadKind,
        result_count: usize,
        page_count: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    ReloadSuperseded {
        generation: u64,
        latest: u64,
    },
}

/// Paginated note display for one rendered screen.
///
/// Cheap to clone; clones share state. Collaborators are injected at
/// construction.
#[derive(Clone)]
pub struct DisplayEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: DisplayConfig,
    selection: Arc<dyn SelectionState>,
    resolver: WorkspaceResolver,
    reconciler: TagReconciler,
    paginator: SearchPaginator,
    identity: Observable<WorkspaceIdentity>,
    results: Observable<PagedResults>,
    fetching: Observable<bool>,
    error_message: Observable<Option<String>>,
    resolution_error: Observable<Option<String>>,
    /// Latest issued generation. Held across check-and-write so no reload can
    /// start between the freshness check and the commit.
    generation: Mutex<u64>,
    event_tx: broadcast::Sender<DisplayEvent>,
}

impl DisplayEngine {
    /// Create an engine. Fails if `config` does not validate.
    pub fn new(
        config: DisplayConfig,
        workspaces: Arc<dyn WorkspaceService>,
        search: Arc<dyn NoteSearchService>,
        selection: Arc<dyn SelectionState>,
    ) -> Result<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);

        let inner = EngineInner {
            identity: Observable::new(WorkspaceIdentity::sentinel(&config.personal_sentinel)),
            results: Observable::new(PagedResults::empty(config.notes_per_page)),
            fetching: Observable::new(false),
            error_message: Observable::new(None),
            resolution_error: Observable::new(None),
            resolver: WorkspaceResolver::new(workspaces.clone()),
            reconciler: TagReconciler::new(workspaces),
            paginator: SearchPaginator::new(search, config.notes_per_page),
            selection,
            config,
            generation: Mutex::new(0),
            event_tx,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.inner.config
    }

    pub fn selection(&self) -> &Arc<dyn SelectionState> {
        &self.inner.selection
    }

    // ─── Triggers ──────────────────────────────────────────────────────────

    /// Resolve the workspace and search, awaiting completion.
    ///
    /// Dropping the future before it completes ends the reload; if it was
    /// still the latest, `fetching` is cleared and the previous pages stay.
    pub async fn reload(&self) -> ReloadOutcome {
        let (ticket, guard) = self.begin(ReloadKind::Plain);
        self.run(ticket, guard).await
    }

    /// Resolve the workspace, reconcile tags and search, awaiting completion.
    pub async fn reload_with_tag_refresh(&self) -> ReloadOutcome {
        let (ticket, guard) = self.begin(ReloadKind::WithTagRefresh);
        self.run(ticket, guard).await
    }

    /// Start a plain reload in the background. `fetching` is already true
    /// when this returns.
    ///
    /// Returns [`Error::Internal`] without touching any state when called
    /// outside a tokio runtime.
    pub fn trigger_reload(&self) -> Result<JoinHandle<ReloadOutcome>> {
        self.spawn(ReloadKind::Plain)
    }

    /// Start a reload with tag refresh in the background.
    ///
    /// Returns [`Error::Internal`] when called outside a tokio runtime.
    pub fn trigger_reload_with_tag_refresh(&self) -> Result<JoinHandle<ReloadOutcome>> {
        self.spawn(ReloadKind::WithTagRefresh)
    }

    fn spawn(&self, kind: ReloadKind) -> Result<JoinHandle<ReloadOutcome>> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Internal(format!("cannot start {kind}: {e}")))?;
        let (ticket, guard) = self.begin(kind);
        let engine = self.clone();
        Ok(handle.spawn(async move { engine.run(ticket, guard).await }))
    }

    // ─── Exposed state ─────────────────────────────────────────────────────

    pub fn fetching(&self) -> bool {
        self.inner.fetching.get()
    }

    /// Last search failure, cleared by the next successful search.
    pub fn error_message(&self) -> Option<String> {
        self.inner.error_message.get()
    }

    pub fn fetch_status(&self) -> FetchStatus {
        FetchStatus {
            fetching: self.fetching(),
            error_message: self.error_message(),
        }
    }

    /// Notes on page `n` (zero-based). Empty when out of range or before the
    /// first search completes.
    pub fn get_page(&self, n: usize) -> Vec<Note> {
        self.inner.results.with(|results| results.page(n))
    }

    pub fn page_count(&self) -> usize {
        self.inner.results.with(PagedResults::page_count)
    }

    pub fn results(&self) -> PagedResults {
        self.inner.results.get()
    }

    pub fn identity(&self) -> WorkspaceIdentity {
        self.inner.identity.get()
    }

    /// Last workspace resolution failure (both lookups failed). Diagnostic
    /// only; never surfaced through [`Self::error_message`].
    pub fn resolution_error(&self) -> Option<String> {
        self.inner.resolution_error.get()
    }

    /// Cached workspace display name. Also starts a background refresh of
    /// the identity when a tokio runtime is available.
    pub fn workspace_display_name(&self) -> String {
        let cached = self.inner.identity.with(|i| i.display_name.clone());
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let generation = self.current_generation();
                let engine = self.clone();
                handle.spawn(async move {
                    engine.refresh_identity_at(generation).await;
                });
            }
            Err(_) => debug!("No async runtime, skipping workspace name refresh"),
        }
        cached
    }

    /// Re-resolve the selection's workspace and publish the identity.
    ///
    /// Returns the identity after the refresh (unchanged if both lookups
    /// failed), or `None` if a reload started meanwhile and the result was
    /// dropped.
    pub async fn refresh_workspace_identity(&self) -> Option<WorkspaceIdentity> {
        self.refresh_identity_at(self.current_generation()).await
    }

    /// Latest generation issued; 0 before the first reload.
    pub fn current_generation(&self) -> u64 {
        *self.lock_generation()
    }

    pub fn subscribe_fetching(&self) -> watch::Receiver<bool> {
        self.inner.fetching.subscribe()
    }

    pub fn subscribe_error_message(&self) -> watch::Receiver<Option<String>> {
        self.inner.error_message.subscribe()
    }

    pub fn subscribe_identity(&self) -> watch::Receiver<WorkspaceIdentity> {
        self.inner.identity.subscribe()
    }

    pub fn subscribe_resolution_error(&self) -> watch::Receiver<Option<String>> {
        self.inner.resolution_error.subscribe()
    }

    pub fn subscribe_results(&self) -> watch::Receiver<PagedResults> {
        self.inner.results.subscribe()
    }

    /// Subscribe to engine events. Slow receivers miss events (`Lagged`).
    pub fn events(&self) -> broadcast::Receiver<DisplayEvent> {
        self.inner.event_tx.subscribe()
    }

    // ─── Reload sequence ───────────────────────────────────────────────────

    fn lock_generation(&self) -> std::sync::MutexGuard<'_, u64> {
        self.inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, kind: ReloadKind) -> (ReloadTicket, FetchingGuard) {
        let generation = {
            let mut latest = self.lock_generation();
            *latest += 1;
            self.inner.fetching.set(true);
            *latest
        };
        debug!(generation, %kind, "Reload started");
        let _ = self
            .inner
            .event_tx
            .send(DisplayEvent::ReloadStarted { generation, kind });
        let guard = FetchingGuard {
            engine: self.clone(),
            generation,
            armed: true,
        };
        (ReloadTicket { generation, kind }, guard)
    }

    /// Run `commit` only if `generation` is still the latest. Returns the
    /// latest generation on refusal.
    ///
    /// `commit` runs under the generation lock and must not re-enter the
    /// engine's triggers.
    fn commit_if_current(&self, generation: u64, commit: impl FnOnce()) -> std::result::Result<(), u64> {
        let latest = self.lock_generation();
        if *latest != generation {
            return Err(*latest);
        }
        commit();
        Ok(())
    }

    #[instrument(
        skip(self, guard),
        fields(component = "engine", generation = ticket.generation, kind = %ticket.kind)
    )]
    async fn run(&self, ticket: ReloadTicket, mut guard: FetchingGuard) -> ReloadOutcome {
        let start = Instant::now();
        let inner = &self.inner;

        let requested = inner.selection.workspace_id();
        let resolution = inner.resolver.resolve(&requested).await;
        if let Err(latest) =
            self.commit_if_current(ticket.generation, || self.apply_resolution(resolution))
        {
            return self.superseded(ticket, latest, "resolve");
        }

        if ticket.kind == ReloadKind::WithTagRefresh {
            let workspace_id = inner.selection.workspace_id();
            let reconciled = inner
                .reconciler
                .reconcile(&workspace_id, inner.selection.as_ref())
                .await;
            if let Err(latest) = self.commit_if_current(ticket.generation, || {
                reconciled.commit(inner.selection.as_ref())
            }) {
                return self.superseded(ticket, latest, "reconcile");
            }
        }

        let request = inner.paginator.request_for(&inner.selection.snapshot());
        let searched = inner.paginator.search(&request).await;

        let mut status = FetchStatus::default();
        let mut counts = (0, 0);
        let committed = self.commit_if_current(ticket.generation, || {
            match searched {
                Ok(results) => {
                    counts = (results.total_notes(), results.page_count());
                    inner.results.set(results);
                    inner.error_message.set(None);
                }
                Err(e) => {
                    warn!(error = %e, "Search failed");
                    inner
                        .results
                        .set(PagedResults::empty(inner.config.notes_per_page));
                    inner.error_message.set(Some(e.to_string()));
                }
            }
            inner.fetching.set(false);
            status = self.fetch_status();
        });
        if let Err(latest) = committed {
            return self.superseded(ticket, latest, "search");
        }
        guard.disarm();

        let (result_count, page_count) = counts;
        info!(
            workspace_id = %request.workspace_id,
            result_count,
            page_count,
            error = ?status.error_message,
            duration_ms = start.elapsed().as_millis() as u64,
            "Reload complete"
        );
        let _ = inner.event_tx.send(DisplayEvent::ReloadCompleted {
            generation: ticket.generation,
            kind: ticket.kind,
            result_count,
            page_count,
            error: status.error_message.clone(),
        });
        ReloadOutcome::Committed(status)
    }

    /// Publish a resolution outcome. Called under the generation lock.
    fn apply_resolution(&self, resolution: Result<Resolution>) {
        let inner = &self.inner;
        match resolution {
            Ok(resolution) => {
                if let Resolution::FellBack {
                    requested,
                    identity,
                } = &resolution
                {
                    let _ = inner.event_tx.send(DisplayEvent::WorkspaceFallback {
                        requested: requested.clone(),
                        workspace_id: identity.id.clone(),
                    });
                }
                resolution.commit(&inner.identity, inner.selection.as_ref());
                inner.resolution_error.set(None);
            }
            Err(e) => {
                warn!(error = %e, "Workspace resolution failed, keeping previous identity");
                inner.resolution_error.set(Some(e.to_string()));
            }
        }
    }

    async fn refresh_identity_at(&self, generation: u64) -> Option<WorkspaceIdentity> {
        let requested = self.inner.selection.workspace_id();
        let resolution = self.inner.resolver.resolve(&requested).await;
        match self.commit_if_current(generation, || self.apply_resolution(resolution)) {
            Ok(()) => Some(self.identity()),
            Err(latest) => {
                debug!(generation, latest, "Discarding stale workspace name refresh");
                None
            }
        }
    }

    fn superseded(&self, ticket: ReloadTicket, latest: u64, stage: &'static str) -> ReloadOutcome {
        debug!(
            generation = ticket.generation,
            latest,
            stage,
            "Discarding stale reload results"
        );
        let _ = self.inner.event_tx.send(DisplayEvent::ReloadSuperseded {
            generation: ticket.generation,
            latest,
        });
        ReloadOutcome::Superseded {
            generation: ticket.generation,
            latest,
        }
    }
}

/// Clears `fetching` when a reload ends without committing its search
/// results, unless a newer reload has started since.
struct FetchingGuard {
    engine: DisplayEngine,
    generation: u64,
    armed: bool,
}

impl FetchingGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FetchingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let fetching = &self.engine.inner.fetching;
        if self
            .engine
            .commit_if_current(self.generation, || fetching.set(false))
            .is_ok()
        {
            debug!(
                generation = self.generation,
                "Reload dropped before commit, fetching cleared"
            );
        }
    }
}

impl fmt::Debug for DisplayEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayEngine")
            .field("config", &self.inner.config)
            .field("identity", &self.inner.identity)
            .field("fetching", &self.inner.fetching)
            .field("generation", &self.current_generation())
            .finish_non_exhaustive()
    }
}
