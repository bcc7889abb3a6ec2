//! `Taskdeck` server library.
//!
//! Exposes the task store, service and HTTP router for use in tests and
//! embedding.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;
