//! Taskboard: a Kanban task board backend.
//!
//! Tasks sit in one of three status columns (`todo`, `in_progress`, `done`)
//! and carry a position that is dense within the column. The reorder engine
//! moves a task between or within columns inside a single store
//! transaction, so every column stays numbered `0..n` whatever happens
//! concurrently.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: `PostgreSQL` and in-memory stores
//!
//! # Modules
//!
//! - [`task`]: Task domain, stores and the reorder engine
//! - [`api`]: JSON-over-HTTP routes
//! - [`config`]: Environment-driven server configuration

pub mod api;
pub mod config;
pub mod task;
