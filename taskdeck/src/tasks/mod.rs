//! Client task list, filters and derived status.
//!
//! The list is an owned [`TaskState`] that the UI reads and the sync event
//! handler mutates. Filters and due status are computed locally and never
//! sent to the server.

pub mod filter;
pub mod state;
pub mod status;

pub use filter::{PriorityFilter, StatusFilter, TaskFilter};
pub use state::{TaskCounts, TaskState};
pub use status::DueStatus;
