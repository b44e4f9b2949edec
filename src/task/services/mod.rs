//! Application services for the task board.

mod board;
pub mod reorder;

pub use board::{
    CreateTaskRequest, DEFAULT_PAGE_SIZE, ListTasksRequest, ReorderTaskRequest, TaskBoardError,
    TaskBoardResult, TaskBoardService, UpdateTaskRequest,
};
pub use reorder::MoveOutcome;
