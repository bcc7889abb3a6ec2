//! Integration tests for the task lifecycle over HTTP.
//!
//! Starts a real server on an ephemeral port with an in-memory store and
//! drives it through [`HttpTaskApi`] and raw `reqwest` requests.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{Value, json};
use taskdeck::api::{HttpTaskApi, TaskApi};
use taskdeck_proto::patch::TaskPatch;
use taskdeck_proto::task::{NewTask, Priority, TaskId};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn start() -> (SocketAddr, HttpTaskApi) {
    let (addr, _handle) = taskdeck_server::routes::start_server("127.0.0.1:0")
        .await
        .expect("server should start");
    let api = HttpTaskApi::new(&format!("http://{addr}"), Duration::from_secs(5))
        .expect("valid base URL");
    (addr, api)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===========================================================================
// Create / update / delete
// ===========================================================================

#[tokio::test]
async fn pay_rent_lifecycle() {
    let (_addr, api) = start().await;

    let created = api
        .create(NewTask::new("Pay rent", Priority::High).with_due_date(date(2024, 1, 1)))
        .await
        .unwrap();
    assert_eq!(created.title, "Pay rent");
    assert_eq!(created.priority, Priority::High);
    assert_eq!(created.due_date, Some(date(2024, 1, 1)));
    assert!(!created.is_completed);
    assert_eq!(created.created_at, created.updated_at);

    let listed = api.list().await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let done = api
        .update(created.id, TaskPatch::completion(true))
        .await
        .unwrap();
    assert!(done.is_completed);
    assert_eq!(done.title, "Pay rent");
    assert_eq!(done.due_date, created.due_date);
    assert_eq!(done.created_at, created.created_at);
    assert!(done.updated_at > created.updated_at);

    api.delete(created.id).await.unwrap();
    assert!(api.list().await.unwrap().is_empty());

    let err = api
        .update(created.id, TaskPatch::completion(false))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Task not found");
}

#[tokio::test]
async fn newest_task_is_listed_first() {
    let (_addr, api) = start().await;

    let first = api.create(NewTask::new("first", Priority::Low)).await.unwrap();
    let second = api.create(NewTask::new("second", Priority::Low)).await.unwrap();

    let ids: Vec<TaskId> = api.list().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn clearing_due_date_keeps_other_fields() {
    let (_addr, api) = start().await;

    let created = api
        .create(
            NewTask::new("Dentist", Priority::Medium)
                .with_due_date(date(2030, 3, 1))
                .with_link("https://example.com/booking"),
        )
        .await
        .unwrap();

    let patch = TaskPatch {
        due_date: Some(None),
        ..TaskPatch::default()
    };
    let updated = api.update(created.id, patch).await.unwrap();
    assert_eq!(updated.due_date, None);
    assert_eq!(updated.link.as_deref(), Some("https://example.com/booking"));
    assert_eq!(updated.priority, Priority::Medium);
}

#[tokio::test]
async fn empty_update_only_bumps_updated_at() {
    let (_addr, api) = start().await;

    let created = api.create(NewTask::new("Nothing", Priority::Low)).await.unwrap();
    let updated = api.update(created.id, TaskPatch::default()).await.unwrap();

    assert_eq!(updated.title, created.title);
    assert_eq!(updated.priority, created.priority);
    assert_eq!(updated.is_completed, created.is_completed);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn deleting_twice_is_not_found() {
    let (_addr, api) = start().await;

    let created = api.create(NewTask::new("Once", Priority::Low)).await.unwrap();
    api.delete(created.id).await.unwrap();

    let err = api.delete(created.id).await.unwrap_err();
    assert!(err.is_not_found());
}

// ===========================================================================
// Raw wire behavior
// ===========================================================================

#[tokio::test]
async fn invalid_priority_is_rejected_and_nothing_persists() {
    let (addr, api) = start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/tasks"))
        .json(&json!({ "title": "Nope", "priority": "CRITICAL" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid priority value");

    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn created_task_uses_camel_case_wire_names() {
    let (addr, _api) = start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/tasks"))
        .json(&json!({
            "title": "  Call mom  ",
            "priority": "URGENT",
            "dueDate": "2030-05-10",
            "dueTime": "18:30",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Call mom");
    assert_eq!(body["priority"], "URGENT");
    assert_eq!(body["dueDate"], "2030-05-10");
    assert_eq!(body["dueTime"], "18:30");
    assert_eq!(body["isCompleted"], false);
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn explicit_null_link_clears_but_absent_link_does_not() {
    let (addr, api) = start().await;
    let client = reqwest::Client::new();

    let created = api
        .create(NewTask::new("Read", Priority::Low).with_link("https://example.com"))
        .await
        .unwrap();
    let url = format!("http://{addr}/api/tasks/{}", created.id);

    let kept: Value = client
        .patch(&url)
        .json(&json!({ "title": "Read more" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(kept["link"], "https://example.com");

    let cleared: Value = client
        .patch(&url)
        .json(&json!({ "link": null }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cleared["link"].is_null());
    assert_eq!(cleared["title"], "Read more");
}

#[tokio::test]
async fn unknown_id_is_not_found_for_get() {
    let (addr, _api) = start().await;

    let resp = reqwest::get(format!("http://{addr}/api/tasks/{}", TaskId::new()))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Task not found");
}
