//! In-memory integration tests for moving tasks between and within columns.

use super::helpers::{Board, board, column, ensure_dense, seed_column};
use rstest::rstest;
use taskboard::task::{
    domain::{TaskId, TaskStatus},
    services::ReorderTaskRequest,
};

fn reorder(task: TaskId, status: TaskStatus, index: i64) -> ReorderTaskRequest {
    ReorderTaskRequest::new(task.value(), i64::from(status.code()), index)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_down_within_a_column_shifts_tasks_up(board: Board) -> Result<(), eyre::Report> {
    let ids = seed_column(&board, TaskStatus::Todo, &["a", "b", "c", "d"]).await?;
    let [a, b, c, d] = ids[..] else {
        eyre::bail!("expected four seeded tasks");
    };

    board.service.reorder(reorder(a, TaskStatus::Todo, 2)).await?;

    eyre::ensure!(
        column(&board.store, TaskStatus::Todo).await? == vec![(b, 0), (c, 1), (a, 2), (d, 3)],
        "unexpected order after moving down"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_up_within_a_column_shifts_tasks_down(board: Board) -> Result<(), eyre::Report> {
    let ids = seed_column(&board, TaskStatus::InProgress, &["a", "b", "c", "d"]).await?;
    let [a, b, c, d] = ids[..] else {
        eyre::bail!("expected four seeded tasks");
    };

    board
        .service
        .reorder(reorder(d, TaskStatus::InProgress, 1))
        .await?;

    eyre::ensure!(
        column(&board.store, TaskStatus::InProgress).await? == vec![(a, 0), (d, 1), (b, 2), (c, 3)],
        "unexpected order after moving up"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_to_another_column_renumbers_both(board: Board) -> Result<(), eyre::Report> {
    let todo = seed_column(&board, TaskStatus::Todo, &["a", "b", "c"]).await?;
    let done = seed_column(&board, TaskStatus::Done, &["x", "y"]).await?;
    let [a, b, c] = todo[..] else {
        eyre::bail!("expected three todo tasks");
    };
    let [x, y] = done[..] else {
        eyre::bail!("expected two done tasks");
    };

    board.service.reorder(reorder(b, TaskStatus::Done, 1)).await?;

    eyre::ensure!(
        column(&board.store, TaskStatus::Todo).await? == vec![(a, 0), (c, 1)],
        "source column not closed up"
    );
    eyre::ensure!(
        column(&board.store, TaskStatus::Done).await? == vec![(x, 0), (b, 1), (y, 2)],
        "destination column not opened up"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moved_task_keeps_its_fields(board: Board) -> Result<(), eyre::Report> {
    let ids = seed_column(&board, TaskStatus::Todo, &["keep me"]).await?;
    let [task] = ids[..] else {
        eyre::bail!("expected one seeded task");
    };

    board.service.reorder(reorder(task, TaskStatus::Done, 0)).await?;

    let moved = board
        .service
        .find_by_id(task.value())
        .await?
        .ok_or_else(|| eyre::eyre!("moved task disappeared"))?;
    eyre::ensure!(moved.title().as_str() == "keep me", "title changed");
    eyre::ensure!(moved.status() == TaskStatus::Done, "status not updated");
    Ok(())
}

#[rstest]
#[case(TaskStatus::Todo, 0)]
#[case(TaskStatus::Todo, 2)]
#[case(TaskStatus::InProgress, 0)]
#[case(TaskStatus::Done, 40)]
#[tokio::test(flavor = "multi_thread")]
async fn every_move_leaves_columns_dense(
    board: Board,
    #[case] target: TaskStatus,
    #[case] index: i64,
) -> Result<(), eyre::Report> {
    let ids = seed_column(&board, TaskStatus::Todo, &["a", "b", "c"]).await?;
    seed_column(&board, TaskStatus::InProgress, &["d", "e"]).await?;
    let moving = ids
        .get(1)
        .copied()
        .ok_or_else(|| eyre::eyre!("missing seeded task"))?;

    board.service.reorder(reorder(moving, target, index)).await?;

    ensure_dense(&board.store).await
}
