//! Domain model for the task board.
//!
//! The task domain models board tasks, their status columns and the dense
//! position arithmetic used when tasks are moved, while keeping every
//! infrastructure concern outside of the domain boundary.

mod error;
mod ids;
mod ordering;
mod patch;
mod query;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{PageNumber, Position, TaskId, TaskTitle};
pub use ordering::{clamp_index, is_dense, renumber};
pub use patch::Patch;
pub use query::{TaskPage, TaskQuery};
pub use status::{Priority, TaskStatus};
pub use task::{PersistedTaskData, Task, TaskDraft, TaskPatch};
