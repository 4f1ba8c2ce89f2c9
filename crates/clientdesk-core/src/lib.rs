#![forbid(unsafe_code)]
//! clientdesk-core library.
//!
//! Task and client data model, the calendar-date classifier, the kanban
//! board engine, and the client CSV import validator.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per concern; `anyhow::Result` at config
//!   loading boundaries.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod board;
pub mod config;
pub mod dates;
pub mod error;
pub mod import;
pub mod model;
pub mod source;
