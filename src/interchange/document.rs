//! Raw interchange document
//!
//! Field values exactly as they appear in the XML, before any
//! normalization. Only the parser creates these.

use std::collections::HashMap;

/// Resource `UID` -> display name
pub type ResourceTable = HashMap<String, String>;

/// Everything the importer reads from a project document
#[derive(Debug, Clone, Default)]
pub struct InterchangeDocument {
    pub project_name: Option<String>,
    pub resources: ResourceTable,
    pub assignments: Vec<RawAssignment>,
    pub tasks: Vec<RawTaskRow>,
}

/// One `<Assignment>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssignment {
    pub task_uid: String,
    pub resource_uid: String,
}

/// One `<PredecessorLink>` element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLink {
    pub predecessor_uid: Option<String>,
    pub type_code: Option<String>,
}

/// One `<Task>` element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTaskRow {
    /// 1-based position among the document's task elements
    pub position: usize,
    pub uid: Option<String>,
    pub name: Option<String>,
    pub outline_level: Option<String>,
    pub start: Option<String>,
    pub finish: Option<String>,
    pub duration: Option<String>,
    pub work: Option<String>,
    pub percent_complete: Option<String>,
    pub priority: Option<String>,
    pub is_null: bool,
    pub links: Vec<RawLink>,
}

impl RawTaskRow {
    /// The project summary row carries `UID` 0 at outline level 0
    pub fn is_project_summary(&self) -> bool {
        self.uid.as_deref() == Some("0") && self.outline_level.as_deref() == Some("0")
    }

    /// The work duration used for display and date fallback
    pub fn work_duration(&self) -> Option<&str> {
        self.duration.as_deref().or(self.work.as_deref())
    }
}
