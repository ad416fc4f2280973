//! Outline CLI - project plan import and task outline engine
//!
//! Imports MS Project XML interchange documents into a forest of task
//! records, normalizing durations, priorities and dates, resolving
//! predecessor links and resource assignments, and rolling group dates up
//! from their children. Forests convert to and from flat, order-indexed
//! lists for persistence and display.

pub mod domain;
pub mod interchange;
pub mod storage;
pub mod cli;

pub use domain::{LinkType, Predecessor, Priority, TaskId, TaskRecord};
pub use interchange::{import, ImportConfig, ImportError, ImportOutcome, ImportReport, Importer};
