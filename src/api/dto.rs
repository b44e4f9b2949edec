//! Request and response bodies for the task board API.
//!
//! Field names follow the board's existing JSON contract: snake case for the
//! CRUD routes and camel case for the reorder route.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::task::{
    domain::{Patch, Task, TaskPage},
    services::{CreateTaskRequest, ListTasksRequest, ReorderTaskRequest, UpdateTaskRequest},
};

/// Body of `POST /create`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskBody {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority code, defaults to medium.
    #[serde(default)]
    pub priority: Option<i64>,
    /// Column code, defaults to todo.
    #[serde(default)]
    pub status: Option<i64>,
    /// Optional ISO 8601 deadline.
    #[serde(default)]
    pub deadline: Option<DeadlineInput>,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        let mut request = Self::new(body.title);
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(priority) = body.priority {
            request = request.with_priority(priority);
        }
        if let Some(status) = body.status {
            request = request.with_status(status);
        }
        if let Some(DeadlineInput(deadline)) = body.deadline {
            request = request.with_deadline(deadline);
        }
        request
    }
}

/// Body of `POST /update`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskBody {
    /// Task to update.
    pub task_id: i64,
    /// Replacement title.
    #[serde(default)]
    pub title: Patch<String>,
    /// Replacement description; `null` clears it.
    #[serde(default)]
    pub description: Patch<Option<String>>,
    /// Replacement priority code.
    #[serde(default)]
    pub priority: Patch<i64>,
    /// Destination column code.
    #[serde(default)]
    pub status: Patch<i64>,
    /// Replacement deadline; `null` clears it.
    #[serde(default)]
    pub deadline: Patch<Option<DeadlineInput>>,
}

impl From<UpdateTaskBody> for UpdateTaskRequest {
    fn from(body: UpdateTaskBody) -> Self {
        Self::new(body.task_id)
            .with_title(body.title)
            .with_description(body.description)
            .with_priority(body.priority)
            .with_status(body.status)
            .with_deadline(
                body.deadline
                    .map(|deadline| deadline.map(|DeadlineInput(at)| at)),
            )
    }
}

/// Deadline accepted on input.
///
/// Takes an RFC 3339 timestamp, a date-time without offset (read as UTC) or
/// a bare `YYYY-MM-DD` date (midnight UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineInput(pub DateTime<Utc>);

impl DeadlineInput {
    /// Parses one of the accepted ISO 8601 forms.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        DateTime::parse_from_rfc3339(text)
            .map(|stamp| stamp.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            })
            .map(Self)
    }
}

impl<'de> Deserialize<'de> for DeadlineInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| D::Error::custom(format!("deadline must be an ISO 8601 date: {raw}")))
    }
}

/// Body of the routes addressing a single task.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TaskIdBody {
    /// Addressed task.
    pub task_id: i64,
}

/// Body of `POST /list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksBody {
    /// Substring matched against title or description.
    #[serde(default)]
    pub search: Option<String>,
    /// One-based page, defaults to 1.
    #[serde(default)]
    pub page: Option<i64>,
    /// Column code filter.
    #[serde(default)]
    pub status: Option<i64>,
}

impl From<ListTasksBody> for ListTasksRequest {
    fn from(body: ListTasksBody) -> Self {
        let mut request = Self::new();
        if let Some(search) = body.search {
            request = request.with_search(search);
        }
        if let Some(page) = body.page {
            request = request.with_page(page);
        }
        if let Some(status) = body.status {
            request = request.with_status(status);
        }
        request
    }
}

/// Body of `POST /reorder-tasks-and-status`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTaskBody {
    /// Task being dragged.
    pub task_id: i64,
    /// Destination column code.
    pub new_status: i64,
    /// Destination index within the column.
    pub new_index: i64,
}

impl From<ReorderTaskBody> for ReorderTaskRequest {
    fn from(body: ReorderTaskBody) -> Self {
        Self::new(body.task_id, body.new_status, body.new_index)
    }
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Creates an acknowledgement.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of `POST /create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTaskResponse {
    /// Assigned identifier.
    pub task_id: i64,
    /// Human-readable outcome.
    pub message: String,
    /// Position the task was appended at.
    pub order_index: usize,
}

/// Wire representation of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    /// Task identifier.
    pub task_id: i64,
    /// Title.
    pub title: String,
    /// Description, if any.
    pub description: Option<String>,
    /// Priority code.
    pub priority: i16,
    /// Column code.
    pub status: i16,
    /// Position within the column.
    pub order_index: usize,
    /// Deadline, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id().value(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            priority: task.priority().code(),
            status: task.status().code(),
            order_index: task.position().index(),
            deadline: task.deadline(),
            created_at: task.created_at(),
        }
    }
}

/// Response of `POST /get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    /// The requested task.
    pub task: TaskView,
}

/// Response of `POST /list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Tasks on the requested page.
    pub tasks: Vec<TaskView>,
    /// Matching tasks across all pages.
    pub total: u64,
    /// Requested page.
    pub page: usize,
    /// Page size.
    pub limit: usize,
}

impl TaskListResponse {
    /// Builds the response for one listing page.
    #[must_use]
    pub fn from_page(page: &TaskPage) -> Self {
        Self {
            tasks: page.tasks.iter().map(TaskView::from).collect(),
            total: page.total,
            page: page.page.value(),
            limit: page.limit,
        }
    }
}
