//! Lock timeout behaviour against `PostgreSQL`.

use std::sync::Arc;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use mockable::DefaultClock;
use rstest::rstest;
use taskboard::task::{
    adapters::postgres::PostgresTaskStore,
    domain::TaskStatus,
    ports::TaskStoreError,
    services::{ReorderTaskRequest, TaskBoardError, TaskBoardService},
};

use super::helpers::{column, seed_column, test_database};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn held_column_lock_times_the_move_out() -> Result<(), eyre::Report> {
    let db = test_database().await?;
    let ids = seed_column(&db.service, TaskStatus::Todo, &["t1", "t2", "t3"]).await?;
    let last = ids
        .last()
        .copied()
        .ok_or_else(|| eyre::eyre!("missing seeded task"))?;
    let before = column(&db.store, TaskStatus::Todo).await?;

    let pool = db.store.pool().clone();
    let (locked_tx, locked_rx) = tokio::sync::oneshot::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let holder = tokio::task::spawn_blocking(move || -> Result<(), eyre::Report> {
        let mut connection = pool.get()?;
        connection.batch_execute(&format!(
            "BEGIN; SELECT 1 FROM tasks WHERE status = {} FOR UPDATE",
            TaskStatus::Todo.code()
        ))?;
        locked_tx
            .send(())
            .map_err(|()| eyre::eyre!("lock waiter went away"))?;
        release_rx.recv()?;
        connection.batch_execute("ROLLBACK")?;
        Ok(())
    });
    locked_rx.await?;

    let impatient = TaskBoardService::new(
        Arc::new(
            PostgresTaskStore::new(db.store.pool().clone())
                .with_transaction_timeout(Duration::from_millis(200)),
        ),
        Arc::new(DefaultClock),
    );
    let result = impatient
        .reorder(ReorderTaskRequest::new(
            last.value(),
            i64::from(TaskStatus::Todo.code()),
            0,
        ))
        .await;

    release_tx.send(())?;
    holder.await??;

    eyre::ensure!(
        matches!(result, Err(TaskBoardError::Store(TaskStoreError::Timeout(_)))),
        "expected a timeout, got {result:?}"
    );
    eyre::ensure!(
        column(&db.store, TaskStatus::Todo).await? == before,
        "timed-out move changed the column"
    );
    Ok(())
}
