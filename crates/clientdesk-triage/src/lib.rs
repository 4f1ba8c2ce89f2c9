#![forbid(unsafe_code)]
//! clientdesk-triage library.
//!
//! Orders and buckets tasks for display. Everything here is a pure function
//! of the task list and a reference date; nothing is cached between calls.
//!
//! # Conventions
//!
//! - **Dates**: callers pass `today` explicitly, usually from a
//!   [`Clock`](clientdesk_core::dates::Clock).
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`).

pub mod display;
pub mod group;
pub mod rank;

pub use display::TaskDisplayInfo;
pub use group::{Bucket, TaskGroups, group_by_due_date};
pub use rank::{compare_urgency, urgency_rank};
