//! In-memory store adapter used by tests and local development.

mod store;

pub use store::InMemoryTaskStore;
