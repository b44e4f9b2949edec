//! Task board management.
//!
//! Tasks live in one of three status columns and carry a dense position
//! within it. Moving a task between or within columns, deleting it and
//! creating it all keep every column's positions exactly `0..n`. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
