//! Service layer for task board operations.

use super::reorder::{self, MoveOutcome};
use crate::task::{
    domain::{
        PageNumber, Patch, Priority, Task, TaskDomainError, TaskDraft, TaskId, TaskPage,
        TaskPatch, TaskQuery, TaskStatus, TaskTitle,
    },
    ports::{TaskStore, TaskStoreError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Default number of tasks per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: Option<i64>,
    status: Option<i64>,
    deadline: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: None,
            status: None,
            deadline: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority code.
    #[must_use]
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the destination column code.
    #[must_use]
    pub const fn with_status(mut self, status: i64) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn into_draft(self) -> Result<TaskDraft, TaskDomainError> {
        let mut draft = TaskDraft::new(TaskTitle::new(self.title)?);
        if let Some(description) = self.description {
            draft = draft.with_description(description);
        }
        if let Some(priority) = self.priority {
            draft = draft.with_priority(Priority::try_from(priority)?);
        }
        if let Some(status) = self.status {
            draft = draft.with_status(TaskStatus::try_from(status)?);
        }
        if let Some(deadline) = self.deadline {
            draft = draft.with_deadline(deadline);
        }
        Ok(draft)
    }
}

/// Request payload for a partial task update.
///
/// A `status` that differs from the task's current column moves the task to
/// the end of the new column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task_id: i64,
    title: Patch<String>,
    description: Patch<Option<String>>,
    priority: Patch<i64>,
    status: Patch<i64>,
    deadline: Patch<Option<DateTime<Utc>>>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing yet.
    #[must_use]
    pub const fn new(task_id: i64) -> Self {
        Self {
            task_id,
            title: Patch::Absent,
            description: Patch::Absent,
            priority: Patch::Absent,
            status: Patch::Absent,
            deadline: Patch::Absent,
        }
    }

    /// Sets the title patch.
    #[must_use]
    pub fn with_title(mut self, title: Patch<String>) -> Self {
        self.title = title;
        self
    }

    /// Sets the description patch; `Present(None)` clears it.
    #[must_use]
    pub fn with_description(mut self, description: Patch<Option<String>>) -> Self {
        self.description = description;
        self
    }

    /// Sets the priority patch.
    #[must_use]
    pub const fn with_priority(mut self, priority: Patch<i64>) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the column patch.
    #[must_use]
    pub const fn with_status(mut self, status: Patch<i64>) -> Self {
        self.status = status;
        self
    }

    /// Sets the deadline patch; `Present(None)` clears it.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Patch<Option<DateTime<Utc>>>) -> Self {
        self.deadline = deadline;
        self
    }

    fn validate(self) -> Result<(TaskId, TaskPatch, Option<TaskStatus>), TaskDomainError> {
        let task_id = TaskId::new(self.task_id)?;
        let patch = TaskPatch {
            title: self.title.try_map(TaskTitle::new)?,
            description: self.description,
            priority: self.priority.try_map(Priority::try_from)?,
            deadline: self.deadline,
        };
        let status = self
            .status
            .try_map(TaskStatus::try_from)?
            .into_option();

        if patch.is_empty() && status.is_none() {
            return Err(TaskDomainError::EmptyUpdate(task_id));
        }
        Ok((task_id, patch, status))
    }
}

/// Request payload for a paged task listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksRequest {
    search: Option<String>,
    page: Option<i64>,
    status: Option<i64>,
}

impl ListTasksRequest {
    /// Creates a request for the first page of every column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by a substring of title or description.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Selects a one-based page.
    #[must_use]
    pub const fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Restricts the listing to one column code.
    #[must_use]
    pub const fn with_status(mut self, status: i64) -> Self {
        self.status = Some(status);
        self
    }

    fn into_query(self, limit: usize) -> Result<TaskQuery, TaskDomainError> {
        Ok(TaskQuery {
            search: self.search.filter(|needle| !needle.is_empty()),
            status: self.status.map(TaskStatus::try_from).transpose()?,
            page: self
                .page
                .map(PageNumber::new)
                .transpose()?
                .unwrap_or_default(),
            limit,
        })
    }
}

/// Request payload for moving a task between or within columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderTaskRequest {
    task_id: i64,
    new_status: i64,
    new_index: i64,
}

impl ReorderTaskRequest {
    /// Creates a move request.
    #[must_use]
    pub const fn new(task_id: i64, new_status: i64, new_index: i64) -> Self {
        Self {
            task_id,
            new_status,
            new_index,
        }
    }

    fn validate(self) -> Result<(TaskId, TaskStatus, usize), TaskDomainError> {
        let task_id = TaskId::new(self.task_id)?;
        let status = TaskStatus::try_from(self.new_status)?;
        let index = usize::try_from(self.new_index)
            .map_err(|_| TaskDomainError::NegativeIndex(self.new_index))?;
        Ok((task_id, status, index))
    }
}

/// Service-level errors for task board operations.
#[derive(Debug, Error)]
pub enum TaskBoardError {
    /// Input validation failed before the store was touched.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The store rejected or failed the transaction.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

impl TaskBoardError {
    /// Returns `true` when the referenced task does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(TaskStoreError::NotFound(_)))
    }
}

/// Result type for task board service operations.
pub type TaskBoardResult<T> = Result<T, TaskBoardError>;

/// Task board orchestration service.
pub struct TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    page_size: usize,
}

impl<S, C> Clone for TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            page_size: self.page_size,
        }
    }
}

impl<S, C> TaskBoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task board service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the listing page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns the listing page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Creates a task at the end of its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] when input validation fails, or
    /// [`TaskBoardError::Store`] when the transaction fails.
    #[instrument(skip_all)]
    pub async fn create(&self, request: CreateTaskRequest) -> TaskBoardResult<Task> {
        let draft = request.into_draft()?;
        let created_at = self.clock.utc();

        let task = self
            .store
            .transact(move |tx| {
                let position = reorder::append_position(tx, draft.status())?;
                tx.insert(&draft, position, created_at)
            })
            .await
            .inspect_err(|err| warn!(error = %err, "create rolled back"))?;

        info!(
            task_id = %task.id(),
            status = %task.status(),
            position = %task.position(),
            "task created"
        );
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] for a malformed identifier, or
    /// [`TaskBoardError::Store`] when the lookup fails.
    pub async fn find_by_id(&self, task_id: i64) -> TaskBoardResult<Option<Task>> {
        let id = TaskId::new(task_id)?;
        Ok(self.store.transact(move |tx| tx.get(id)).await?)
    }

    /// Applies a partial update and returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] when input validation fails, or
    /// [`TaskBoardError::Store`] when the task is missing or the
    /// transaction fails.
    #[instrument(skip_all, fields(task_id = request.task_id))]
    pub async fn update(&self, request: UpdateTaskRequest) -> TaskBoardResult<Task> {
        let (task_id, patch, status) = request.validate()?;

        let task = self
            .store
            .transact(move |tx| {
                let current = tx.get(task_id)?.ok_or(TaskStoreError::NotFound(task_id))?;
                // Column locks come before the row write, matching every other path.
                if let Some(target) = status.filter(|target| *target != current.status()) {
                    reorder::move_task(tx, task_id, target, usize::MAX)?;
                }
                if !patch.is_empty() {
                    tx.update_fields(task_id, &patch)?;
                }
                tx.get(task_id)?.ok_or(TaskStoreError::NotFound(task_id))
            })
            .await
            .inspect_err(|err| warn!(error = %err, "update rolled back"))?;

        info!("task updated");
        Ok(task)
    }

    /// Deletes a task and renumbers its former column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] for a malformed identifier, or
    /// [`TaskBoardError::Store`] when the task is missing or the
    /// transaction fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, task_id: i64) -> TaskBoardResult<Task> {
        let id = TaskId::new(task_id)?;
        let removed = self
            .store
            .transact(move |tx| reorder::remove_task(tx, id))
            .await
            .inspect_err(|err| warn!(error = %err, "delete rolled back"))?;

        info!(status = %removed.status(), "task deleted");
        Ok(removed)
    }

    /// Returns one page of tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] when the filters are invalid, or
    /// [`TaskBoardError::Store`] when the read fails.
    pub async fn list(&self, request: ListTasksRequest) -> TaskBoardResult<TaskPage> {
        let query = request.into_query(self.page_size)?;
        Ok(self.store.transact(move |tx| tx.search(&query)).await?)
    }

    /// Moves a task to a column and index, keeping both columns dense.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] when input validation fails, or
    /// [`TaskBoardError::Store`] when the task is missing or the
    /// transaction fails. On error the store is left unchanged.
    #[instrument(skip_all, fields(task_id = request.task_id, new_status = request.new_status, new_index = request.new_index))]
    pub async fn reorder(&self, request: ReorderTaskRequest) -> TaskBoardResult<MoveOutcome> {
        let (task_id, status, index) = request.validate()?;

        let outcome = self
            .store
            .transact(move |tx| reorder::move_task(tx, task_id, status, index))
            .await
            .inspect_err(|err| warn!(error = %err, "reorder rolled back"))?;

        info!(
            from = %outcome.from,
            to = %outcome.to,
            position = %outcome.position,
            writes = outcome.writes,
            "task reordered"
        );
        Ok(outcome)
    }
}
