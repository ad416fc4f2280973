//! Domain models for the outline engine
//!
//! Contains the task model and the pure hierarchy algorithms, without any
//! I/O concerns.

mod id;
mod task;
mod graph;
pub mod fields;
pub mod hierarchy;
pub mod rollup;

pub use id::{IdError, IdGenerator, TaskId};
pub use task::{LinkType, Predecessor, Priority, TaskRecord};
pub use graph::PredecessorGraph;
