//! In-memory task store with a store-wide transaction lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::task::{
    domain::{Position, Task, TaskDraft, TaskId, TaskPage, TaskPatch, TaskQuery, TaskStatus},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};

/// Default bound on waiting for the transaction lock.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Thread-safe in-memory task store.
///
/// Transactions are serialized by a single async mutex. Each transaction
/// works on a copy of the table that replaces the shared state only when the
/// work succeeds, so a failed transaction leaves nothing behind.
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore {
    state: Arc<Mutex<InMemoryTaskState>>,
    lock_timeout: Duration,
}

#[derive(Debug, Clone)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    next_id: i64,
}

impl Default for InMemoryTaskState {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryTaskState::default())),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Sets how long a transaction waits for the store lock.
    #[must_use]
    pub const fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn transact<T, F>(&self, work: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut guard = tokio::time::timeout(self.lock_timeout, self.state.lock())
            .await
            .map_err(|_| TaskStoreError::Timeout(self.lock_timeout))?;

        let mut working = guard.clone();
        let outcome = work(&mut working)?;
        *guard = working;
        Ok(outcome)
    }
}

impl InMemoryTaskState {
    fn task_mut(&mut self, id: TaskId) -> TaskStoreResult<&mut Task> {
        self.tasks.get_mut(&id).ok_or(TaskStoreError::NotFound(id))
    }

    fn allocate_id(&mut self) -> TaskStoreResult<TaskId> {
        let id = TaskId::new(self.next_id).map_err(TaskStoreError::persistence)?;
        self.next_id = self.next_id.saturating_add(1);
        Ok(id)
    }
}

impl TaskTransaction for InMemoryTaskState {
    fn get(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn list_by_status(&mut self, status: TaskStatus) -> TaskStoreResult<Vec<Task>> {
        let mut column: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.status() == status)
            .cloned()
            .collect();
        column.sort_by_key(|task| (task.position(), task.id()));
        Ok(column)
    }

    fn set_position(&mut self, id: TaskId, position: Position) -> TaskStoreResult<()> {
        let task = self.task_mut(id)?;
        let status = task.status();
        task.place(status, position);
        Ok(())
    }

    fn set_status_and_position(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        position: Position,
    ) -> TaskStoreResult<()> {
        self.task_mut(id)?.place(status, position);
        Ok(())
    }

    fn insert(
        &mut self,
        draft: &TaskDraft,
        position: Position,
        created_at: DateTime<Utc>,
    ) -> TaskStoreResult<Task> {
        let id = self.allocate_id()?;
        let task = Task::from_draft(id, draft, position, created_at);
        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    fn update_fields(&mut self, id: TaskId, patch: &TaskPatch) -> TaskStoreResult<()> {
        self.task_mut(id)?.apply(patch);
        Ok(())
    }

    fn delete(&mut self, id: TaskId) -> TaskStoreResult<()> {
        self.tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskStoreError::NotFound(id))
    }

    fn search(&mut self, query: &TaskQuery) -> TaskStoreResult<TaskPage> {
        let mut matching: Vec<&Task> = self
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .collect();
        matching.sort_by_key(|task| (task.position(), Reverse(task.created_at()), task.id()));

        let total = u64::try_from(matching.len()).map_err(TaskStoreError::persistence)?;
        let tasks = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .cloned()
            .collect();
        Ok(TaskPage {
            tasks,
            total,
            page: query.page,
            limit: query.limit,
        })
    }
}
