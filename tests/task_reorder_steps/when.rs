//! When steps for task reorder BDD scenarios.

use super::world::{TaskReorderWorld, parse_status, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskboard::task::services::ReorderTaskRequest;

#[when(r#"task "{title}" is moved to the "{column}" column at index {requested}"#)]
fn move_task(
    world: &mut TaskReorderWorld,
    title: String,
    column: String,
    requested: String,
) -> Result<(), eyre::Report> {
    let index: i64 = requested
        .parse()
        .wrap_err_with(|| format!("invalid index {requested:?} in scenario"))?;
    let task = world.task_id(&title)?;
    let status = parse_status(&column)?;
    let request = ReorderTaskRequest::new(task.value(), i64::from(status.code()), index);
    world.last_move_result = Some(run_async(world.service.reorder(request)));
    Ok(())
}

#[when(r#"task "{title}" is deleted"#)]
fn delete_task(world: &mut TaskReorderWorld, title: String) -> Result<(), eyre::Report> {
    let task = world.task_id(&title)?;
    run_async(world.service.delete(task.value()))
        .wrap_err_with(|| format!("delete task {title:?}"))?;
    world.tasks_by_title.remove(&title);
    Ok(())
}
