//! Test helpers for display engine tests.
//!
//! Provides a scripted search service, engine construction and optional log
//! output (set `RUST_LOG` to see it).

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notescope_display::{
    DisplayConfig, DisplayEngine, Error, InMemorySelection, InMemoryWorkspaceService, Note,
    NoteSearchRequest, NoteSearchService, Result, SelectionSnapshot, Workspace,
};

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// One scripted answer: wait `delay`, then return `result`.
pub struct Step {
    pub delay: Duration,
    pub result: Result<Vec<Note>>,
}

impl Step {
    pub fn ok(delay_ms: u64, notes: Vec<Note>) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            result: Ok(notes),
        }
    }

    pub fn fail(delay_ms: u64, message: &str) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            result: Err(Error::Service(message.to_string())),
        }
    }
}

/// Search service answering calls in order from a script. The step is taken
/// when the call starts, so the Nth call gets the Nth step regardless of
/// completion order. Calls past the end of the script return no notes.
#[derive(Default)]
pub struct ScriptedSearch {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<NoteSearchRequest>>,
}

impl ScriptedSearch {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<NoteSearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NoteSearchService for ScriptedSearch {
    async fn find(&self, request: &NoteSearchRequest) -> Result<Vec<Note>> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                tokio::time::sleep(step.delay).await;
                step.result
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Workspace service with team workspace `w1` ("Team") and personal
/// workspace `p1` ("My Notes").
pub fn team_workspaces() -> InMemoryWorkspaceService {
    InMemoryWorkspaceService::new()
        .with_workspace(Workspace::new("w1", "Team"))
        .with_personal(Workspace::new("p1", "My Notes"))
}

/// `count` notes of `note_type` in `workspace_id`, titled "note 0", "note 1", ...
pub fn notes(workspace_id: &str, note_type: &str, count: usize) -> Vec<Note> {
    (0..count)
        .map(|i| Note::new(workspace_id, note_type, format!("note {i}")))
        .collect()
}

pub struct Harness {
    pub engine: DisplayEngine,
    pub selection: Arc<InMemorySelection>,
}

pub fn harness(
    workspaces: Arc<InMemoryWorkspaceService>,
    search: Arc<dyn NoteSearchService>,
    selection: SelectionSnapshot,
) -> Harness {
    init_tracing();
    let selection = Arc::new(InMemorySelection::new(selection));
    let engine = DisplayEngine::new(
        DisplayConfig::default(),
        workspaces,
        search,
        selection.clone(),
    )
    .expect("default config is valid");
    Harness { engine, selection }
}
