//! Listing criteria and paged results.

use super::{PageNumber, Task, TaskStatus};

/// Criteria for a paged task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Substring matched against title or description.
    pub search: Option<String>,
    /// Restricts the listing to one column.
    pub status: Option<TaskStatus>,
    /// Requested page.
    pub page: PageNumber,
    /// Page size.
    pub limit: usize,
}

impl TaskQuery {
    /// Creates a query for the first page of every column.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            search: None,
            status: None,
            page: PageNumber::FIRST,
            limit,
        }
    }

    /// Number of rows skipped before the requested page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.offset(self.limit)
    }

    /// Returns `true` when `task` satisfies the search and status filters.
    ///
    /// The search ignores case.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_matches = self.status.is_none_or(|status| task.status() == status);
        let search_matches = self.search.as_deref().is_none_or(|needle| {
            let folded = needle.to_lowercase();
            contains_folded(task.title().as_str(), &folded)
                || task
                    .description()
                    .is_some_and(|text| contains_folded(text, &folded))
        });
        status_matches && search_matches
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// One page of a task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks on this page, ordered by position then newest first.
    pub tasks: Vec<Task>,
    /// Number of tasks matching the filters across all pages.
    pub total: u64,
    /// The page that was read.
    pub page: PageNumber,
    /// Page size used for the read.
    pub limit: usize,
}
