//! `Taskdeck` terminal client library.
//!
//! Exposes the API client, sync worker, task state and UI for use in tests.

pub mod api;
pub mod app;
pub mod config;
pub mod form;
pub mod sync;
pub mod tasks;
pub mod ui;
