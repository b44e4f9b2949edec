//! Transactional store port for task persistence and column ordering.

use crate::task::domain::{
    Position, Task, TaskDraft, TaskId, TaskPage, TaskPatch, TaskQuery, TaskStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Operations available inside one store transaction.
///
/// Writes made through a transaction are invisible to other transactions
/// until the owning [`TaskStore::transact`] call commits.
#[cfg_attr(test, mockall::automock)]
pub trait TaskTransaction {
    /// Reads a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    fn get(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Returns the tasks of one column ordered by position ascending.
    ///
    /// Implementations lock the returned rows until the transaction ends
    /// where the backend supports it.
    fn list_by_status(&mut self, status: TaskStatus) -> TaskStoreResult<Vec<Task>>;

    /// Rewrites the position of a task without changing its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn set_position(&mut self, id: TaskId, position: Position) -> TaskStoreResult<()>;

    /// Moves a task to `status` at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn set_status_and_position(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        position: Position,
    ) -> TaskStoreResult<()>;

    /// Inserts a new task at `position` in the draft's column and returns it
    /// with its assigned identifier.
    fn insert(
        &mut self,
        draft: &TaskDraft,
        position: Position,
        created_at: DateTime<Utc>,
    ) -> TaskStoreResult<Task>;

    /// Applies the plain field changes in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn update_fields(&mut self, id: TaskId, patch: &TaskPatch) -> TaskStoreResult<()>;

    /// Removes a task row. Callers close the resulting gap.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn delete(&mut self, id: TaskId) -> TaskStoreResult<()>;

    /// Returns one page of tasks matching `query`.
    fn search(&mut self, query: &TaskQuery) -> TaskStoreResult<TaskPage>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Runs `work` inside one serializable transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back on
    /// every other exit path, so no partial write is ever visible.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a transient
    /// [`TaskStoreError`] when the transaction cannot begin or commit in
    /// time.
    async fn transact<T, F>(&self, work: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A concurrent transaction touched the same rows.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// The transaction could not complete in time.
    #[error("transaction timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for failures a caller may retry unchanged.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Timeout(_))
    }
}
