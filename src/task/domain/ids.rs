//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use std::fmt;

/// Unique identifier for a persisted task.
///
/// Identifiers are assigned by the store on insert and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(i64);

impl TaskId {
    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskId`] when the value is zero or
    /// negative.
    pub const fn new(value: i64) -> Result<Self, TaskDomainError> {
        if value <= 0 {
            return Err(TaskDomainError::InvalidTaskId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based rank of a task within its status column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(usize);

impl Position {
    /// The first slot of a column.
    pub const FIRST: Self = Self(0);

    /// Creates a position from a zero-based index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the zero-based index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the slot directly after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty task title of bounded length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Maximum title length in characters, matching the persisted column.
    pub const MAX_CHARS: usize = 100;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed value is
    /// empty, or [`TaskDomainError::TitleTooLong`] when it exceeds
    /// [`Self::MAX_CHARS`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_CHARS {
            return Err(TaskDomainError::TitleTooLong {
                max: Self::MAX_CHARS,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-based page number for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(usize);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Creates a validated page number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPage`] when the value is below one.
    pub fn new(value: i64) -> Result<Self, TaskDomainError> {
        usize::try_from(value)
            .ok()
            .filter(|page| *page >= 1)
            .map(Self)
            .ok_or(TaskDomainError::InvalidPage(value))
    }

    /// Returns the page number.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }

    /// Returns the number of rows preceding this page.
    #[must_use]
    pub const fn offset(self, limit: usize) -> usize {
        self.0.saturating_sub(1).saturating_mul(limit)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}
