//! `PostgreSQL` adapter for task persistence.

mod models;
mod schema;
mod store;

pub use store::{PostgresTaskStore, TaskPgPool, ensure_schema};
