//! Shared protocol definitions for the `Taskdeck` HTTP API.

pub mod api;
pub mod patch;
pub mod task;
pub mod wire;
