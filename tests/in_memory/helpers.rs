//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{Position, TaskId, TaskStatus, is_dense},
    ports::TaskStore,
    services::{CreateTaskRequest, TaskBoardService},
};

/// Service type used by the in-memory tests.
pub type TestService = TaskBoardService<InMemoryTaskStore, DefaultClock>;

/// A board service together with direct access to its store.
#[derive(Clone)]
pub struct Board {
    /// Store backing the service.
    pub store: Arc<InMemoryTaskStore>,
    /// Service under test.
    pub service: TestService,
}

/// Provides an empty board for each test.
#[fixture]
pub fn board() -> Board {
    let store = Arc::new(InMemoryTaskStore::new());
    let service = TaskBoardService::new(Arc::clone(&store), Arc::new(DefaultClock));
    Board { store, service }
}

/// Creates one task per title in `status`, in order.
///
/// # Errors
///
/// Returns an error if any creation fails.
pub async fn seed_column(
    board: &Board,
    status: TaskStatus,
    titles: &[&str],
) -> Result<Vec<TaskId>, eyre::Report> {
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        let request = CreateTaskRequest::new(*title).with_status(i64::from(status.code()));
        ids.push(board.service.create(request).await?.id());
    }
    Ok(ids)
}

/// Reads a column as `(id, position)` pairs in position order.
///
/// # Errors
///
/// Returns an error if the store read fails.
pub async fn column(
    store: &InMemoryTaskStore,
    status: TaskStatus,
) -> Result<Vec<(TaskId, usize)>, eyre::Report> {
    let tasks = store.transact(move |tx| tx.list_by_status(status)).await?;
    Ok(tasks
        .iter()
        .map(|task| (task.id(), task.position().index()))
        .collect())
}

/// Reads every column in board order.
///
/// # Errors
///
/// Returns an error if any store read fails.
pub async fn snapshot(store: &InMemoryTaskStore) -> Result<Vec<Vec<(TaskId, usize)>>, eyre::Report> {
    let mut columns = Vec::with_capacity(TaskStatus::ALL.len());
    for status in TaskStatus::ALL {
        columns.push(column(store, status).await?);
    }
    Ok(columns)
}

/// Fails unless every column's positions are exactly `0..n`.
///
/// # Errors
///
/// Returns an error naming the first column that is not dense.
pub async fn ensure_dense(store: &InMemoryTaskStore) -> Result<(), eyre::Report> {
    for status in TaskStatus::ALL {
        let entries = column(store, status).await?;
        eyre::ensure!(
            is_dense(entries.iter().map(|(_, position)| Position::new(*position))),
            "column {status} is not dense: {entries:?}"
        );
    }
    Ok(())
}
