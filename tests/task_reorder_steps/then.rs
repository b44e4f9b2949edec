//! Then steps for task reorder BDD scenarios.

use super::world::{TaskReorderWorld, parse_status, run_async};
use rstest_bdd_macros::then;
use taskboard::task::{
    domain::TaskDomainError,
    ports::TaskStore,
    services::TaskBoardError,
};

fn column_titles(world: &TaskReorderWorld, column: &str) -> Result<Vec<String>, eyre::Report> {
    let status = parse_status(column)?;
    let tasks = run_async(world.store.transact(move |tx| tx.list_by_status(status)))?;

    for (expected, task) in tasks.iter().enumerate() {
        if task.position().index() != expected {
            return Err(eyre::eyre!(
                "column {column} has {} at position {}, expected {expected}",
                task.title(),
                task.position()
            ));
        }
    }
    Ok(tasks
        .iter()
        .map(|task| task.title().as_str().to_owned())
        .collect())
}

#[then(r#"the "{column}" column reads "{order}""#)]
fn column_reads(world: &TaskReorderWorld, column: String, order: String) -> Result<(), eyre::Report> {
    let expected: Vec<&str> = order.split(',').map(str::trim).collect();
    let actual = column_titles(world, &column)?;

    if actual != expected {
        return Err(eyre::eyre!(
            "expected column {column} to read {expected:?}, found {actual:?}"
        ));
    }
    Ok(())
}

#[then(r#"the "{column}" column is empty"#)]
fn column_is_empty(world: &TaskReorderWorld, column: String) -> Result<(), eyre::Report> {
    let actual = column_titles(world, &column)?;
    if !actual.is_empty() {
        return Err(eyre::eyre!("expected column {column} to be empty, found {actual:?}"));
    }
    Ok(())
}

#[then("the move is rejected as invalid input")]
fn move_rejected(world: &TaskReorderWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;

    if !matches!(
        result,
        Err(TaskBoardError::Domain(TaskDomainError::NegativeIndex(_)))
    ) {
        return Err(eyre::eyre!("expected NegativeIndex error, got {result:?}"));
    }
    Ok(())
}
