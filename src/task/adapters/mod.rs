//! Store adapters for the task board.

pub mod memory;
pub mod postgres;
