//! Task aggregate, creation drafts and partial updates.

use super::{Patch, Position, Priority, TaskId, TaskStatus, TaskTitle};
use chrono::{DateTime, Utc};

/// A task placed on the board.
///
/// Status and position change only through the store's ordering operations;
/// every other field changes through a [`TaskPatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    priority: Priority,
    status: TaskStatus,
    position: Position,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted column.
    pub status: TaskStatus,
    /// Persisted rank within the column.
    pub position: Position,
    /// Persisted deadline, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            priority: data.priority,
            status: data.status,
            position: data.position,
            deadline: data.deadline,
            created_at: data.created_at,
        }
    }

    /// Materializes a freshly inserted task from its draft.
    #[must_use]
    pub fn from_draft(
        id: TaskId,
        draft: &TaskDraft,
        position: Position,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            priority: draft.priority,
            status: draft.status,
            position,
            deadline: draft.deadline,
            created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the column the task sits in.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the rank within the column.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Places the task at `position` in the `status` column.
    ///
    /// Store adapters call this while renumbering; callers are responsible
    /// for keeping the column dense.
    pub const fn place(&mut self, status: TaskStatus, position: Position) {
        self.status = status;
        self.position = position;
    }

    /// Applies every present field of `patch`.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Patch::Present(title) = &patch.title {
            self.title = title.clone();
        }
        if let Patch::Present(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Patch::Present(priority) = patch.priority {
            self.priority = priority;
        }
        if let Patch::Present(deadline) = patch.deadline {
            self.deadline = deadline;
        }
    }
}

/// Validated input for a task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: TaskTitle,
    description: Option<String>,
    priority: Priority,
    status: TaskStatus,
    deadline: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// Creates a draft for the `todo` column with medium priority.
    #[must_use]
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            priority: Priority::default(),
            status: TaskStatus::default(),
            deadline: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the destination column.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the destination column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }
}

/// Partial update of the plain task fields.
///
/// `description` and `deadline` are nullable: `Present(None)` clears them
/// while `Absent` leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Patch<TaskTitle>,
    /// Replacement description.
    pub description: Patch<Option<String>>,
    /// Replacement priority.
    pub priority: Patch<Priority>,
    /// Replacement deadline.
    pub deadline: Patch<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Returns `true` when no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_absent()
            && self.description.is_absent()
            && self.priority.is_absent()
            && self.deadline.is_absent()
    }
}
