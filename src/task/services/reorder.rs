//! Reorder engine: moves tasks between columns while keeping every column
//! dense.
//!
//! The functions here run inside a store transaction and only issue writes
//! for tasks whose column or position actually changes. They never commit;
//! the surrounding [`TaskStore::transact`](crate::task::ports::TaskStore::transact)
//! call decides.

use crate::task::{
    domain::{Position, Task, TaskId, TaskStatus, clamp_index, renumber},
    ports::{TaskStoreError, TaskStoreResult, TaskTransaction},
};

/// Summary of a completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The moved task.
    pub task_id: TaskId,
    /// Column the task left.
    pub from: TaskStatus,
    /// Column the task now sits in.
    pub to: TaskStatus,
    /// Final position after clamping.
    pub position: Position,
    /// Number of rows rewritten.
    pub writes: usize,
}

impl MoveOutcome {
    /// Returns `true` when the move changed nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.writes == 0
    }
}

/// Moves `task_id` to `new_status` at `new_index`.
///
/// Indexes past the end of the destination column append the task.
///
/// # Errors
///
/// Returns [`TaskStoreError::NotFound`] when the task does not exist, or any
/// error raised by the transaction.
pub fn move_task(
    tx: &mut dyn TaskTransaction,
    task_id: TaskId,
    new_status: TaskStatus,
    new_index: usize,
) -> TaskStoreResult<MoveOutcome> {
    let moved = tx.get(task_id)?.ok_or(TaskStoreError::NotFound(task_id))?;
    let old_status = moved.status();
    let mut writes = 0;

    let (source, mut destination) = lock_columns(tx, old_status, new_status, task_id)?;
    for (id, position) in renumber(&source) {
        tx.set_position(id, position)?;
        writes += 1;
    }

    let index = clamp_index(new_index, destination.len());
    destination.insert(index, (task_id, moved.position()));

    let rewrites = renumber(&destination);
    let mut position = moved.position();
    for (id, target) in rewrites {
        if id == task_id {
            position = target;
            continue;
        }
        tx.set_position(id, target)?;
        writes += 1;
    }

    if old_status != new_status || position != moved.position() {
        tx.set_status_and_position(task_id, new_status, position)?;
        writes += 1;
    }

    Ok(MoveOutcome {
        task_id,
        from: old_status,
        to: new_status,
        position,
        writes,
    })
}

/// Deletes `task_id` and closes the gap it leaves in its column.
///
/// # Errors
///
/// Returns [`TaskStoreError::NotFound`] when the task does not exist, or any
/// error raised by the transaction.
pub fn remove_task(tx: &mut dyn TaskTransaction, task_id: TaskId) -> TaskStoreResult<Task> {
    let removed = tx.get(task_id)?.ok_or(TaskStoreError::NotFound(task_id))?;
    // The column is locked before the row itself is touched.
    let remaining = column_without(tx, removed.status(), task_id)?;
    tx.delete(task_id)?;

    for (id, position) in renumber(&remaining) {
        tx.set_position(id, position)?;
    }
    Ok(removed)
}

/// Returns the slot after the last task of `status`.
///
/// # Errors
///
/// Returns any error raised by the transaction.
pub fn append_position(
    tx: &mut dyn TaskTransaction,
    status: TaskStatus,
) -> TaskStoreResult<Position> {
    Ok(tx
        .list_by_status(status)?
        .iter()
        .map(Task::position)
        .max()
        .map_or(Position::FIRST, Position::next))
}

/// Reads the source and destination columns of a move, leaving out `moved`.
///
/// Columns are always read in ascending status order, so two moves between
/// the same pair of columns lock their rows in the same order whichever way
/// they travel. The source is empty for a move within one column.
fn lock_columns(
    tx: &mut dyn TaskTransaction,
    from: TaskStatus,
    to: TaskStatus,
    moved: TaskId,
) -> TaskStoreResult<(Vec<(TaskId, Position)>, Vec<(TaskId, Position)>)> {
    if from == to {
        return Ok((Vec::new(), column_without(tx, to, moved)?));
    }

    let lower = column_without(tx, from.min(to), moved)?;
    let upper = column_without(tx, from.max(to), moved)?;
    if from < to {
        Ok((lower, upper))
    } else {
        Ok((upper, lower))
    }
}

/// Reads a column in position order, leaving out `excluded`.
fn column_without(
    tx: &mut dyn TaskTransaction,
    status: TaskStatus,
    excluded: TaskId,
) -> TaskStoreResult<Vec<(TaskId, Position)>> {
    Ok(tx
        .list_by_status(status)?
        .iter()
        .filter(|task| task.id() != excluded)
        .map(|task| (task.id(), task.position()))
        .collect())
}
