//! Route handlers for the task board API.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use mockable::Clock;

use super::dto::{
    CreateTaskBody, CreatedTaskResponse, ListTasksBody, MessageResponse, ReorderTaskBody,
    TaskIdBody, TaskListResponse, TaskResponse, TaskView, UpdateTaskBody,
};
use super::error::ApiError;
use crate::task::{ports::TaskStore, services::TaskBoardService};

/// Shared handler state.
pub type BoardState<S, C> = State<Arc<TaskBoardService<S, C>>>;

/// `POST /create`
pub async fn create_task<S, C>(
    State(service): BoardState<S, C>,
    payload: Result<Json<CreateTaskBody>, JsonRejection>,
) -> Result<Json<CreatedTaskResponse>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload?;
    let task = service
        .create(body.into())
        .await
        .map_err(|err| ApiError::from_board(err, "create task"))?;

    Ok(Json(CreatedTaskResponse {
        task_id: task.id().value(),
        message: "Task created".to_owned(),
        order_index: task.position().index(),
    }))
}

/// `POST /update`
pub async fn update_task<S, C>(
    State(service): BoardState<S, C>,
    payload: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload?;
    service
        .update(body.into())
        .await
        .map_err(|err| ApiError::from_board(err, "update task"))?;
    Ok(Json(MessageResponse::new("Task updated")))
}

/// `POST /delete`
pub async fn delete_task<S, C>(
    State(service): BoardState<S, C>,
    payload: Result<Json<TaskIdBody>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload?;
    service
        .delete(body.task_id)
        .await
        .map_err(|err| ApiError::from_board(err, "delete task"))?;
    Ok(Json(MessageResponse::new("Task deleted")))
}

/// `POST /list`
pub async fn list_tasks<S, C>(
    State(service): BoardState<S, C>,
    payload: Result<Json<ListTasksBody>, JsonRejection>,
) -> Result<Json<TaskListResponse>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload?;
    let page = service
        .list(body.into())
        .await
        .map_err(|err| ApiError::from_board(err, "list tasks"))?;
    Ok(Json(TaskListResponse::from_page(&page)))
}

/// `POST /get`
pub async fn get_task<S, C>(
    State(service): BoardState<S, C>,
    payload: Result<Json<TaskIdBody>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload?;
    let task = service
        .find_by_id(body.task_id)
        .await
        .map_err(|err| ApiError::from_board(err, "get task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_owned()))?;
    Ok(Json(TaskResponse {
        task: TaskView::from(&task),
    }))
}

/// `POST /reorder-tasks-and-status`
pub async fn reorder_task<S, C>(
    State(service): BoardState<S, C>,
    payload: Result<Json<ReorderTaskBody>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload?;
    service
        .reorder(body.into())
        .await
        .map_err(|err| ApiError::from_board(err, "reorder tasks"))?;
    Ok(Json(MessageResponse::new("Tasks reordered")))
}
