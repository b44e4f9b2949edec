//! Dense position arithmetic for board columns.

use super::{Position, TaskId};

/// Clamps a requested insertion index into `0..=len`.
///
/// Indexes past the end append the task as the last entry.
#[must_use]
pub fn clamp_index(requested: usize, len: usize) -> usize {
    requested.min(len)
}

/// Computes the rewrites that make an ordered column dense.
///
/// `ordered` lists the column's tasks in their desired order with their
/// current positions. The result holds only the tasks whose position has to
/// change, each paired with its new position.
#[must_use]
pub fn renumber(ordered: &[(TaskId, Position)]) -> Vec<(TaskId, Position)> {
    ordered
        .iter()
        .enumerate()
        .filter_map(|(index, &(task_id, current))| {
            let target = Position::new(index);
            (current != target).then_some((task_id, target))
        })
        .collect()
}

/// Returns `true` when `positions` is exactly `{0, 1, …, k-1}`.
#[must_use]
pub fn is_dense(positions: impl IntoIterator<Item = Position>) -> bool {
    let mut sorted: Vec<Position> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| position.index() == index)
}
