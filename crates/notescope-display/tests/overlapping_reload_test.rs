//! Overlapping reloads: results of a superseded reload must never be shown,
//! whichever of the two finishes first.
//!
//! Runs on paused time; service latencies are simulated with `tokio::time`.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{harness, notes, team_workspaces, ScriptedSearch, Step};
use notescope_display::{
    DisplayEvent, InMemoryWorkspaceService, ReloadOutcome, SelectionSnapshot, SelectionState,
    TagSet, Workspace,
};

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn slow_workspaces() -> Arc<InMemoryWorkspaceService> {
    Arc::new(team_workspaces().with_latency(Duration::from_millis(10)))
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_reload_is_discarded() {
    let stale = notes("w1", "content", 7);
    let fresh = notes("w1", "content", 2);
    let search = Arc::new(ScriptedSearch::new([
        Step::ok(500, stale),
        Step::ok(20, fresh.clone()),
    ]));
    let h = harness(
        slow_workspaces(),
        search.clone(),
        SelectionSnapshot::for_workspace("w1"),
    );

    let first = h.engine.trigger_reload().unwrap();
    advance(50).await;
    let second = h.engine.trigger_reload().unwrap();

    let second = second.await.unwrap();
    assert!(second.is_committed());
    assert!(!h.engine.fetching());
    assert_eq!(h.engine.get_page(0), fresh);

    let first = first.await.unwrap();
    assert_eq!(
        first,
        ReloadOutcome::Superseded {
            generation: 1,
            latest: 2
        }
    );
    assert_eq!(h.engine.get_page(0), fresh, "stale results must not overwrite");
    assert!(!h.engine.fetching());
    assert_eq!(search.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fast_stale_reload_does_not_clear_fetching() {
    let fresh = notes("w1", "content", 4);
    let search = Arc::new(ScriptedSearch::new([
        Step::fail(100, "timeout"),
        Step::ok(500, fresh.clone()),
    ]));
    let h = harness(
        slow_workspaces(),
        search,
        SelectionSnapshot::for_workspace("w1"),
    );

    let first = h.engine.trigger_reload().unwrap();
    advance(50).await;
    let second = h.engine.trigger_reload().unwrap();

    assert!(!first.await.unwrap().is_committed());
    assert!(h.engine.fetching(), "latest reload still in flight");
    assert!(h.engine.error_message().is_none(), "stale error is not shown");
    assert!(h.engine.get_page(0).is_empty());

    assert!(second.await.unwrap().is_committed());
    assert!(!h.engine.fetching());
    assert_eq!(h.engine.get_page(0), fresh);
}

#[tokio::test(start_paused = true)]
async fn test_stale_fallback_does_not_rewrite_selection() {
    let workspaces = slow_workspaces();
    let h = harness(
        workspaces.clone(),
        Arc::new(ScriptedSearch::default()),
        SelectionSnapshot::for_workspace("deleted"),
    );

    let first = h.engine.trigger_reload().unwrap();
    // The user navigates to w1 while the first lookup is in flight.
    advance(5).await;
    h.selection.set_workspace_id("w1");
    let second = h.engine.trigger_reload().unwrap();

    let (first, second) = (first.await.unwrap(), second.await.unwrap());
    assert!(!first.is_committed());
    assert!(second.is_committed());
    assert_eq!(h.selection.workspace_id(), "w1");
    assert_eq!(h.engine.identity().display_name, "Team");
}

#[tokio::test(start_paused = true)]
async fn test_selection_edit_during_tag_fetch_is_respected() {
    let workspaces = Arc::new(
        InMemoryWorkspaceService::new()
            .with_workspace(Workspace::new("w1", "Team"))
            .with_tags("w1", ["a", "b", "c"])
            .with_latency(Duration::from_millis(10)),
    );
    let h = harness(
        workspaces,
        Arc::new(ScriptedSearch::default()),
        SelectionSnapshot::for_workspace("w1").with_all_tags_selected(true),
    );

    let reload = h.engine.trigger_reload_with_tag_refresh().unwrap();
    // Workspace lookup ends at 10ms, tag fetch at 20ms.
    advance(15).await;
    let explicit: TagSet = ["b".to_string()].into_iter().collect();
    h.selection.update_tag_selection(explicit.clone(), false);

    assert!(reload.await.unwrap().is_committed());
    assert_eq!(h.selection.selected_tags(), explicit);
    assert!(!h.selection.all_tags_selected());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_event_published() {
    let search = Arc::new(ScriptedSearch::new([
        Step::ok(300, Vec::new()),
        Step::ok(10, Vec::new()),
    ]));
    let h = harness(slow_workspaces(), search, SelectionSnapshot::for_workspace("w1"));
    let mut events = h.engine.events();

    let first = h.engine.trigger_reload().unwrap();
    advance(50).await;
    let second = h.engine.trigger_reload().unwrap();
    second.await.unwrap();
    first.await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&DisplayEvent::ReloadSuperseded {
        generation: 1,
        latest: 2
    }));
    assert_eq!(
        seen.iter()
            .filter(|e| matches!(e, DisplayEvent::ReloadCompleted { .. }))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_display_name_refresh_dropped_when_reload_starts() {
    let workspaces = slow_workspaces();
    let h = harness(
        workspaces.clone(),
        Arc::new(ScriptedSearch::default()),
        SelectionSnapshot::for_workspace("w1"),
    );

    let refresh = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.refresh_workspace_identity().await })
    };
    tokio::task::yield_now().await;
    let reload = h.engine.trigger_reload().unwrap();

    assert_eq!(refresh.await.unwrap(), None);
    assert!(reload.await.unwrap().is_committed());
    assert_eq!(h.engine.identity().display_name, "Team");
}

// =============================================================================
// CANCELLATION
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_timed_out_reload_clears_fetching() {
    let h = harness(
        Arc::new(team_workspaces().with_latency(Duration::from_millis(100))),
        Arc::new(ScriptedSearch::default()),
        SelectionSnapshot::for_workspace("w1"),
    );

    let timed_out = tokio::time::timeout(Duration::from_millis(10), h.engine.reload())
        .await
        .is_err();

    assert!(timed_out);
    assert!(!h.engine.fetching());
    advance(5_000).await;
    assert!(!h.engine.fetching());
    assert!(h.engine.error_message().is_none());

    assert!(h.engine.reload().await.is_committed());
    assert_eq!(h.engine.identity().display_name, "Team");
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_stale_reload_keeps_latest_fetching() {
    let h = harness(
        slow_workspaces(),
        Arc::new(ScriptedSearch::new([
            Step::ok(500, Vec::new()),
            Step::ok(100, Vec::new()),
        ])),
        SelectionSnapshot::for_workspace("w1"),
    );

    let first = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.reload().await })
    };
    advance(50).await;
    let second = h.engine.trigger_reload().unwrap();

    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());
    assert!(h.engine.fetching(), "latest reload still in flight");

    assert!(second.await.unwrap().is_committed());
    assert!(!h.engine.fetching());
}
