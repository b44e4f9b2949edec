//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a positive integer.
    #[error("invalid task id {0}, expected a positive integer")]
    InvalidTaskId(i64),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the persisted column width.
    #[error("task title has {actual} characters, exceeds limit of {max}")]
    TitleTooLong {
        /// Maximum number of characters accepted.
        max: usize,
        /// Number of characters supplied.
        actual: usize,
    },

    /// The status code does not name a board column.
    #[error("invalid status {0}, expected 0, 1 or 2")]
    InvalidStatus(i64),

    /// The priority code is out of range.
    #[error("invalid priority {0}, expected 1, 2 or 3")]
    InvalidPriority(i64),

    /// A target index below zero was requested.
    #[error("invalid index {0}, expected a non-negative integer")]
    NegativeIndex(i64),

    /// The requested page is below one.
    #[error("invalid page {0}, expected a positive integer")]
    InvalidPage(i64),

    /// An update named no field to change.
    #[error("update for task {0} must change at least one field")]
    EmptyUpdate(TaskId),
}

/// Error returned while parsing task statuses from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
