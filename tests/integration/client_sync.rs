//! Integration tests for the client sync worker against a live server.
//!
//! Commands go through [`spawn_sync`] with the real HTTP client, and the
//! resulting events are applied to an [`App`] the same way the TUI loop
//! does it.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use taskdeck::api::{HttpTaskApi, TaskApi};
use taskdeck::app::{App, NoticeKind};
use taskdeck::sync::{SyncAction, SyncCommand, SyncEvent, spawn_sync};
use taskdeck::tasks::{PriorityFilter, StatusFilter, TaskFilter};
use taskdeck_proto::patch::TaskPatch;
use taskdeck_proto::task::{NewTask, Priority, TaskId};
use tokio::sync::mpsc;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

struct Harness {
    base_url: String,
    app: App,
    cmd_tx: mpsc::Sender<SyncCommand>,
    evt_rx: mpsc::Receiver<SyncEvent>,
}

impl Harness {
    async fn start() -> Self {
        let (addr, _handle) = taskdeck_server::routes::start_server("127.0.0.1:0")
            .await
            .expect("server should start");
        let base_url = format!("http://{addr}");
        let api = HttpTaskApi::new(&base_url, Duration::from_secs(5)).expect("valid base URL");
        let (cmd_tx, evt_rx, _worker) = spawn_sync(api, 16);
        let mut harness = Self {
            base_url,
            app: App::new(),
            cmd_tx,
            evt_rx,
        };
        let load = harness.app.start();
        harness.round_trip(load).await;
        harness
    }

    /// Sends `cmd`, waits for its event, applies it and returns a copy.
    async fn round_trip(&mut self, cmd: SyncCommand) -> SyncEvent {
        self.cmd_tx.send(cmd).await.unwrap();
        let event = tokio::time::timeout(EVENT_TIMEOUT, self.evt_rx.recv())
            .await
            .expect("sync event in time")
            .expect("worker still running");
        self.app.apply_sync_event(event.clone());
        event
    }

    async fn create(&mut self, title: &str, priority: Priority) -> TaskId {
        match self
            .round_trip(SyncCommand::create(NewTask::new(title, priority)))
            .await
        {
            SyncEvent::Created { task, .. } => task.id,
            other => panic!("expected Created, got {other:?}"),
        }
    }
}

// ===========================================================================
// Confirmed results reach local state
// ===========================================================================

#[tokio::test]
async fn initial_load_of_empty_server() {
    let h = Harness::start().await;

    assert!(h.app.state.is_loaded());
    assert!(!h.app.show_loading());
    assert_eq!(h.app.state.counts().total, 0);
}

#[tokio::test]
async fn created_tasks_are_prepended() {
    let mut h = Harness::start().await;

    let first = h.create("Buy milk", Priority::Low).await;
    let second = h.create("Pay rent", Priority::High).await;

    let ids: Vec<TaskId> = h.app.state.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn toggle_completion_replaces_task_in_place() {
    let mut h = Harness::start().await;
    let older = h.create("Older", Priority::Low).await;
    let newer = h.create("Newer", Priority::Low).await;

    h.round_trip(SyncCommand::update(older, TaskPatch::completion(true)))
        .await;

    let tasks = h.app.state.tasks();
    assert_eq!(tasks[0].id, newer);
    assert_eq!(tasks[1].id, older);
    assert!(tasks[1].is_completed);
    assert_eq!(tasks[1].title, "Older");

    let counts = h.app.state.counts();
    assert_eq!((counts.total, counts.completed, counts.remaining), (2, 1, 1));
}

#[tokio::test]
async fn delete_removes_task() {
    let mut h = Harness::start().await;
    let keep = h.create("Keep", Priority::Medium).await;
    let drop_me = h.create("Drop", Priority::Medium).await;

    let event = h.round_trip(SyncCommand::Delete(drop_me)).await;
    assert_eq!(event, SyncEvent::Deleted(drop_me));

    assert!(h.app.state.get(drop_me).is_none());
    assert!(h.app.state.get(keep).is_some());
}

#[tokio::test]
async fn reload_matches_server_state() {
    let mut h = Harness::start().await;
    h.create("One", Priority::Low).await;
    h.create("Two", Priority::Urgent).await;
    let local = h.app.state.tasks().to_vec();

    h.app.state.begin_load();
    h.round_trip(SyncCommand::Load).await;

    assert_eq!(h.app.state.tasks(), local.as_slice());
}

#[tokio::test]
async fn filters_apply_to_confirmed_tasks() {
    let mut h = Harness::start().await;
    let done = h.create("Done", Priority::High).await;
    let open = h.create("Open", Priority::High).await;
    h.create("Low", Priority::Low).await;
    h.round_trip(SyncCommand::update(done, TaskPatch::completion(true)))
        .await;

    h.app.filter = TaskFilter::new(StatusFilter::Active, PriorityFilter::Only(Priority::High));
    let visible: Vec<TaskId> = h.app.visible_tasks().iter().map(|t| t.id).collect();
    assert_eq!(visible, vec![open]);
}

// ===========================================================================
// Failures leave local state untouched
// ===========================================================================

#[tokio::test]
async fn update_of_deleted_task_fails_without_changing_state() {
    let mut h = Harness::start().await;
    let id = h.create("Ghost", Priority::Low).await;

    // Delete on the server behind the client's back.
    let other = HttpTaskApi::new(&h.base_url, Duration::from_secs(5)).unwrap();
    other.delete(id).await.unwrap();

    let before = h.app.state.tasks().to_vec();
    let event = h
        .round_trip(SyncCommand::update(id, TaskPatch::completion(true)))
        .await;

    match event {
        SyncEvent::Failed {
            action, task_id, ..
        } => {
            assert_eq!(action, SyncAction::Update);
            assert_eq!(task_id, Some(id));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(h.app.state.tasks(), before.as_slice());

    let notice = h.app.notice.as_ref().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "Could not update task: Task not found");
}

#[tokio::test]
async fn unreachable_server_reports_load_failure() {
    // Bind and immediately drop a listener to get a port nobody serves.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpTaskApi::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let (cmd_tx, mut evt_rx, _worker) = spawn_sync(api, 4);
    let mut app = App::new();
    cmd_tx.send(app.start()).await.unwrap();

    let event = tokio::time::timeout(EVENT_TIMEOUT, evt_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        event,
        SyncEvent::Failed {
            action: SyncAction::Load,
            ..
        }
    ));
    app.apply_sync_event(event);

    assert!(!app.state.is_loading());
    assert!(!app.state.is_loaded());
    assert_eq!(app.state.counts().total, 0);
    assert_eq!(app.notice.as_ref().unwrap().kind, NoticeKind::Error);
}
