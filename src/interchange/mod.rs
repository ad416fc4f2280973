//! # Project Interchange Import
//!
//! Converts MS Project XML documents into task forests.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Parse | [`parser::parse_document`] | raw rows, resource and assignment tables |
//! | Assignments | [`resolver::resolve_assignments`] | task UID -> resource names |
//! | Rows | [`parser::collect_rows`] | pending records + [`IdentifierMap`] |
//! | Links | [`resolver::resolve_links`] | predecessors in engine IDs |
//! | Outline | `domain::hierarchy::build` | forest |
//! | Rollup | `domain::rollup::recalculate_forest` | group dates and spans |
//!
//! ## Failure Model
//!
//! - Document-level problems (unreadable stream, malformed XML, wrong root
//!   element) return an [`ImportError`]
//! - Row-level and reference-level problems are recovered locally and
//!   collected as [`Diagnostic`]s in the [`ImportReport`]
//!
//! ## Entry Point
//!
//! [`Importer::import`], or [`import`] for the default configuration.

pub mod document;
pub mod parser;
pub mod resolver;
mod progress;
mod report;
mod import;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::fields::DEFAULT_HOURS_PER_DAY;

pub use import::{import, ImportOutcome, Importer};
pub use progress::{CancelToken, ProgressSink};
pub use report::{Diagnostic, ImportReport};
pub use resolver::{AssignmentTable, IdentifierMap};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Not a project interchange document: {0}")]
    Format(String),

    #[error("Failed to read document: {0}")]
    Read(#[from] std::io::Error),

    #[error("Import cancelled")]
    Cancelled,
}

/// Conventions applied while importing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Working hours in one day of work duration
    pub hours_per_day: f64,

    /// Name given to tasks with a blank name
    pub placeholder_name: String,

    /// Drop the project summary row (UID 0) and lift its children to level 0
    pub skip_project_summary: bool,

    /// Separator between assigned resource names
    pub assignment_separator: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            placeholder_name: "Unnamed Task".to_string(),
            skip_project_summary: true,
            assignment_separator: ", ".to_string(),
        }
    }
}
