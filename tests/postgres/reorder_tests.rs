//! Reorder engine tests against `PostgreSQL`.

use rstest::rstest;
use taskboard::task::{
    domain::{TaskId, TaskStatus},
    services::{ReorderTaskRequest, TaskBoardError},
};
use tokio::task::JoinSet;

use super::helpers::{column, ensure_dense, seed_column, test_database};

fn reorder(task: TaskId, status: TaskStatus, index: i64) -> ReorderTaskRequest {
    ReorderTaskRequest::new(task.value(), i64::from(status.code()), index)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_column_move_rotates_the_range() -> Result<(), eyre::Report> {
    let db = test_database().await?;
    let ids = seed_column(&db.service, TaskStatus::Todo, &["t1", "t2", "t3"]).await?;
    let [t1, t2, t3] = ids[..] else {
        eyre::bail!("expected three seeded tasks");
    };

    db.service.reorder(reorder(t3, TaskStatus::Todo, 0)).await?;

    eyre::ensure!(
        column(&db.store, TaskStatus::Todo).await? == vec![(t3, 0), (t1, 1), (t2, 2)],
        "unexpected order after move"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_column_move_passes_the_deferred_constraint() -> Result<(), eyre::Report> {
    let db = test_database().await?;
    let todo = seed_column(&db.service, TaskStatus::Todo, &["t1", "t2"]).await?;
    let doing = seed_column(&db.service, TaskStatus::InProgress, &["t3"]).await?;
    let [t1, t2] = todo[..] else {
        eyre::bail!("expected two todo tasks");
    };
    let [t3] = doing[..] else {
        eyre::bail!("expected one in-progress task");
    };

    db.service
        .reorder(reorder(t1, TaskStatus::InProgress, 0))
        .await?;

    eyre::ensure!(
        column(&db.store, TaskStatus::Todo).await? == vec![(t2, 0)],
        "todo not closed up"
    );
    eyre::ensure!(
        column(&db.store, TaskStatus::InProgress).await? == vec![(t1, 0), (t3, 1)],
        "in-progress not opened up"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_move_issues_no_writes() -> Result<(), eyre::Report> {
    let db = test_database().await?;
    let ids = seed_column(&db.service, TaskStatus::Done, &["a", "b", "c"]).await?;
    let b = ids
        .get(1)
        .copied()
        .ok_or_else(|| eyre::eyre!("missing seeded task"))?;

    db.service.reorder(reorder(b, TaskStatus::Done, 2)).await?;
    let repeat = db.service.reorder(reorder(b, TaskStatus::Done, 2)).await?;

    eyre::ensure!(repeat.is_noop(), "repeat wrote {} rows", repeat.writes);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_moves_never_break_density() -> Result<(), eyre::Report> {
    let db = test_database().await?;
    let mut ids = seed_column(&db.service, TaskStatus::Todo, &["a", "b", "c", "d"]).await?;
    ids.extend(seed_column(&db.service, TaskStatus::InProgress, &["e", "f"]).await?);

    let mut moves = JoinSet::new();
    for (round, task) in ids.iter().copied().cycle().take(18).enumerate() {
        let status = TaskStatus::ALL
            .get(round % TaskStatus::ALL.len())
            .copied()
            .ok_or_else(|| eyre::eyre!("status out of range"))?;
        let service = db.service.clone();
        let index = i64::try_from(round % 4)?;
        moves.spawn(async move { service.reorder(reorder(task, status, index)).await });
    }

    while let Some(joined) = moves.join_next().await {
        match joined? {
            Ok(_) => {}
            Err(TaskBoardError::Store(err)) if err.is_transient() => {}
            Err(other) => eyre::bail!("unexpected failure: {other}"),
        }
    }

    let mut total = 0;
    for status in TaskStatus::ALL {
        total += column(&db.store, status).await?.len();
    }
    eyre::ensure!(total == 6, "tasks lost or duplicated: {total}");
    ensure_dense(&db.store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn opposite_cross_column_moves_stay_transient() -> Result<(), eyre::Report> {
    let db = test_database().await?;
    let todo = seed_column(
        &db.service,
        TaskStatus::Todo,
        &["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"],
    )
    .await?;
    let doing = seed_column(
        &db.service,
        TaskStatus::InProgress,
        &["p0", "p1", "p2", "p3", "p4", "p5", "p6", "p7"],
    )
    .await?;

    let mut moves = JoinSet::new();
    for (task_from_todo, task_from_doing) in todo.iter().zip(&doing).cycle().take(20) {
        for (task, status) in [
            (*task_from_todo, TaskStatus::InProgress),
            (*task_from_doing, TaskStatus::Todo),
        ] {
            let service = db.service.clone();
            moves.spawn(async move { service.reorder(reorder(task, status, 0)).await });
        }
    }

    while let Some(joined) = moves.join_next().await {
        match joined? {
            Ok(_) => {}
            Err(TaskBoardError::Store(err)) if err.is_transient() => {}
            Err(other) => eyre::bail!("non-transient failure: {other}"),
        }
    }

    let mut total = 0;
    for status in TaskStatus::ALL {
        total += column(&db.store, status).await?.len();
    }
    eyre::ensure!(total == 16, "tasks lost or duplicated: {total}");
    ensure_dense(&db.store).await
}
