//! Task record model
//!
//! A [`TaskRecord`] is the canonical entity shared by the hierarchy builder,
//! the flattener, the rollup pass and the interchange importer. Records own
//! their children; a forest is simply `Vec<TaskRecord>`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::TaskId;

/// Directional dependency kind between two tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    FinishToFinish,
    /// Predecessor must finish before the successor starts
    #[default]
    FinishToStart,
    StartToFinish,
    StartToStart,
}

impl LinkType {
    /// Maps an interchange link code (`0=FF, 1=FS, 2=SF, 3=SS`)
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LinkType::FinishToFinish),
            1 => Some(LinkType::FinishToStart),
            2 => Some(LinkType::StartToFinish),
            3 => Some(LinkType::StartToStart),
            _ => None,
        }
    }

    /// Returns the short label used in outlines (`FS`, `SS`, ...)
    pub fn label(&self) -> &'static str {
        match self {
            LinkType::FinishToFinish => "FF",
            LinkType::FinishToStart => "FS",
            LinkType::StartToFinish => "SF",
            LinkType::StartToStart => "SS",
        }
    }
}

/// A resolved dependency on another task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predecessor {
    /// The task that must be scheduled first
    pub task: TaskId,
    /// The kind of link
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
}

impl Predecessor {
    pub fn new(task: TaskId, link_type: LinkType) -> Self {
        Self { task, link_type }
    }
}

/// Qualitative priority bucket
///
/// `Other` carries source values that could not be mapped to a bucket,
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
            Priority::Other(raw) => raw,
        }
    }

    /// Returns true if this is one of the four known buckets
    pub fn is_mapped(&self) -> bool {
        !matches!(self, Priority::Other(_))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Low" => Priority::Low,
            "Medium" => Priority::Medium,
            "High" => Priority::High,
            "Critical" => Priority::Critical,
            _ => Priority::Other(value),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

fn default_expanded() -> bool {
    true
}

fn is_false(val: &bool) -> bool {
    !*val
}

/// A task in an outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Engine-generated identifier
    pub id: TaskId,

    /// Identifier from the source document, for traceability only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,

    /// Display name (never empty)
    pub name: String,

    /// `None` means unknown
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,

    /// `None` means unknown
    #[serde(default)]
    pub finish_date: Option<NaiveDateTime>,

    /// Human-readable duration; dates are authoritative
    #[serde(default)]
    pub duration_display: String,

    /// 0..=100
    #[serde(default)]
    pub percent_complete: u8,

    #[serde(default)]
    pub priority: Priority,

    /// Comma-joined resource names
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub assigned_to: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessors: Vec<Predecessor>,

    /// Nesting depth, 0 = top level
    #[serde(default)]
    pub indent_level: u32,

    /// Position in the flat document order
    #[serde(default)]
    pub order_index: u64,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_group: bool,

    /// Owned subtree, rebuilt by every hierarchy build
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskRecord>,

    /// Display state, only consulted by the flattener
    #[serde(default = "default_expanded")]
    pub is_expanded: bool,
}

impl TaskRecord {
    /// Creates a leaf task with unknown dates
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            legacy_id: None,
            name: name.into(),
            start_date: None,
            finish_date: None,
            duration_display: String::new(),
            percent_complete: 0,
            priority: Priority::default(),
            assigned_to: String::new(),
            predecessors: Vec::new(),
            indent_level: 0,
            order_index: 0,
            is_group: false,
            children: Vec::new(),
            is_expanded: true,
        }
    }

    /// Sets the outline position
    pub fn at(mut self, indent_level: u32, order_index: u64) -> Self {
        self.indent_level = indent_level;
        self.order_index = order_index;
        self
    }

    /// Sets the schedule
    pub fn scheduled(mut self, start: NaiveDateTime, finish: NaiveDateTime) -> Self {
        self.start_date = Some(start);
        self.finish_date = Some(finish);
        self
    }

    /// Returns true if the task has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns a copy of this record without its subtree
    pub fn detached(&self) -> TaskRecord {
        TaskRecord {
            id: self.id.clone(),
            legacy_id: self.legacy_id.clone(),
            name: self.name.clone(),
            start_date: self.start_date,
            finish_date: self.finish_date,
            duration_display: self.duration_display.clone(),
            percent_complete: self.percent_complete,
            priority: self.priority.clone(),
            assigned_to: self.assigned_to.clone(),
            predecessors: self.predecessors.clone(),
            indent_level: self.indent_level,
            order_index: self.order_index,
            is_group: self.is_group,
            children: Vec::new(),
            is_expanded: self.is_expanded,
        }
    }

    /// Adds a predecessor link unless the same link already exists
    pub fn add_predecessor(&mut self, predecessor: Predecessor) -> bool {
        if self.predecessors.contains(&predecessor) {
            false
        } else {
            self.predecessors.push(predecessor);
            true
        }
    }

    /// Returns the span `(start, finish)` when both dates are known
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.start_date?, self.finish_date?))
    }
}
