//! Given steps for task reorder BDD scenarios.

use super::world::{TaskReorderWorld, parse_status, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::task::services::CreateTaskRequest;

#[given(r#"a task "{title}" in the "{column}" column"#)]
fn task_in_column(
    world: &mut TaskReorderWorld,
    title: String,
    column: String,
) -> Result<(), eyre::Report> {
    let status = parse_status(&column)?;
    let request = CreateTaskRequest::new(title.clone()).with_status(i64::from(status.code()));
    let created = run_async(world.service.create(request))
        .wrap_err_with(|| format!("create task {title:?} for scenario setup"))?;
    world.tasks_by_title.insert(title, created.id());
    Ok(())
}
