//! Property tests for partial-update semantics.
//!
//! Uses proptest to verify:
//! 1. Keys absent from an update body never change the task.
//! 2. Keys present in an update body always win.
//! 3. Arbitrary JSON objects never panic the validator.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use proptest::prelude::*;
use serde_json::{Map, Value};
use taskdeck_proto::patch::UpdateTaskRequest;
use taskdeck_proto::task::{Priority, Task, TaskId};
use uuid::Uuid;

/// Strategy for generating arbitrary priorities.
fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

/// Strategy for generating arbitrary dates in a sane range.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
}

/// Strategy for generating minute-precision times.
fn arb_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default())
}

/// Strategy for generating stored tasks that satisfy the model invariants.
fn arb_task() -> impl Strategy<Value = Task> {
    (
        any::<u128>(),
        "[a-zA-Z][a-zA-Z0-9 ]{0,30}",
        proptest::option::of((arb_date(), proptest::option::of(arb_time()))),
        arb_priority(),
        proptest::option::of("https://[a-z]{1,10}\\.dev"),
        any::<bool>(),
        0i64..4_000_000_000,
    )
        .prop_map(|(id, title, due, priority, link, done, secs)| {
            let at = DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default();
            Task {
                id: TaskId::from_uuid(Uuid::from_u128(id)),
                title: title.trim().to_string(),
                due_date: due.map(|(d, _)| d),
                due_time: due.and_then(|(_, t)| t),
                priority,
                link,
                is_completed: done,
                created_at: at,
                updated_at: at,
            }
        })
}

/// Strategy for generating update bodies as JSON objects with a random
/// subset of keys, each either a valid value or `null` where allowed.
fn arb_update_body() -> impl Strategy<Value = Map<String, Value>> {
    (
        proptest::option::of("[a-zA-Z][a-zA-Z0-9]{0,20}"),
        proptest::option::of(proptest::option::of(arb_date())),
        proptest::option::of(arb_priority()),
        proptest::option::of(proptest::option::of("https://[a-z]{1,10}\\.dev")),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(title, due_date, priority, link, done)| {
            let mut body = Map::new();
            if let Some(title) = title {
                body.insert("title".into(), Value::String(title));
            }
            if let Some(due_date) = due_date {
                body.insert(
                    "dueDate".into(),
                    due_date.map_or(Value::Null, |d| Value::String(d.to_string())),
                );
                // Clearing the date must also clear the time.
                if due_date.is_none() {
                    body.insert("dueTime".into(), Value::Null);
                }
            }
            if let Some(priority) = priority {
                body.insert("priority".into(), Value::String(priority.to_string()));
            }
            if let Some(link) = link {
                body.insert("link".into(), link.map_or(Value::Null, Value::String));
            }
            if let Some(done) = done {
                body.insert("isCompleted".into(), Value::Bool(done));
            }
            body
        })
}

proptest! {
    #[test]
    fn absent_keys_leave_fields_untouched(task in arb_task(), body in arb_update_body()) {
        let req: UpdateTaskRequest = serde_json::from_value(Value::Object(body.clone())).unwrap();
        let patch = req.validate().unwrap();
        prop_assert!(patch.validate_against(&task).is_ok());

        let mut patched = task.clone();
        patch.apply_to(&mut patched);

        if !body.contains_key("title") {
            prop_assert_eq!(&patched.title, &task.title);
        }
        if !body.contains_key("dueDate") {
            prop_assert_eq!(patched.due_date, task.due_date);
        }
        if !body.contains_key("dueTime") {
            prop_assert_eq!(patched.due_time, task.due_time);
        }
        if !body.contains_key("priority") {
            prop_assert_eq!(patched.priority, task.priority);
        }
        if !body.contains_key("link") {
            prop_assert_eq!(&patched.link, &task.link);
        }
        if !body.contains_key("isCompleted") {
            prop_assert_eq!(patched.is_completed, task.is_completed);
        }
        prop_assert_eq!(patched.id, task.id);
        prop_assert_eq!(patched.created_at, task.created_at);
        prop_assert_eq!(patched.updated_at, task.updated_at);
    }

    #[test]
    fn present_keys_always_win(task in arb_task(), body in arb_update_body()) {
        let req: UpdateTaskRequest = serde_json::from_value(Value::Object(body.clone())).unwrap();
        let mut patched = task;
        req.validate().unwrap().apply_to(&mut patched);

        if let Some(Value::String(title)) = body.get("title") {
            prop_assert_eq!(&patched.title, title);
        }
        if let Some(Value::Null) = body.get("dueDate") {
            prop_assert_eq!(patched.due_date, None);
        }
        if let Some(Value::Bool(done)) = body.get("isCompleted") {
            prop_assert_eq!(patched.is_completed, *done);
        }
        if let Some(Value::Null) = body.get("link") {
            prop_assert_eq!(patched.link, None);
        }
    }

    #[test]
    fn arbitrary_strings_never_panic(
        title in ".{0,40}",
        priority in ".{0,12}",
        date in ".{0,30}",
        time in ".{0,30}",
    ) {
        let body = serde_json::json!({
            "title": title,
            "priority": priority,
            "dueDate": date,
            "dueTime": time,
        });
        if let Ok(req) = serde_json::from_value::<UpdateTaskRequest>(body) {
            let _ = req.validate();
        }
    }
}
