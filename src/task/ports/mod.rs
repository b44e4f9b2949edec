//! Port contracts for the task board.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod store;

pub use store::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction};

#[cfg(test)]
pub use store::MockTaskTransaction;
