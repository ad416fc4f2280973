//! Import diagnostics
//!
//! Row-level and reference-level problems never abort an import. They are
//! collected here and returned next to the imported forest.

use serde::Serialize;
use std::fmt;

use crate::domain::TaskId;

/// A recoverable problem found while importing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A task row was dropped
    RowSkipped {
        row: usize,
        uid: Option<String>,
        reason: String,
    },
    /// A predecessor link names a task that was never imported
    DanglingPredecessor {
        task_uid: String,
        predecessor_uid: String,
    },
    /// A predecessor link carries an unrecognised type code
    UnknownLinkType {
        task_uid: String,
        predecessor_uid: String,
        code: String,
    },
    /// A task lists itself as its own predecessor
    SelfLink { task_uid: String },
    /// A task lists the same predecessor and link type more than once
    DuplicateLink {
        task_uid: String,
        predecessor_uid: String,
    },
    /// An assignment names a resource missing from the resource table
    DanglingAssignment {
        task_uid: String,
        resource_uid: String,
    },
    /// A field value could not be interpreted and was kept verbatim
    AmbiguousField {
        task_uid: String,
        field: String,
        value: String,
    },
    /// Resolved links form a dependency loop
    CyclicLinks { tasks: Vec<TaskId> },
}

impl Diagnostic {
    /// Returns true for diagnostics that dropped a predecessor link
    pub fn drops_link(&self) -> bool {
        matches!(
            self,
            Diagnostic::DanglingPredecessor { .. }
                | Diagnostic::UnknownLinkType { .. }
                | Diagnostic::SelfLink { .. }
                | Diagnostic::DuplicateLink { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RowSkipped { row, uid, reason } => match uid {
                Some(uid) => write!(f, "row {} (UID {}) skipped: {}", row, uid, reason),
                None => write!(f, "row {} skipped: {}", row, reason),
            },
            Diagnostic::DanglingPredecessor {
                task_uid,
                predecessor_uid,
            } => write!(
                f,
                "task {}: predecessor {} not found, link dropped",
                task_uid, predecessor_uid
            ),
            Diagnostic::UnknownLinkType {
                task_uid,
                predecessor_uid,
                code,
            } => write!(
                f,
                "task {}: link to {} has unknown type '{}', link dropped",
                task_uid, predecessor_uid, code
            ),
            Diagnostic::SelfLink { task_uid } => {
                write!(f, "task {}: links to itself, link dropped", task_uid)
            }
            Diagnostic::DuplicateLink {
                task_uid,
                predecessor_uid,
            } => write!(
                f,
                "task {}: repeated link to {}, link dropped",
                task_uid, predecessor_uid
            ),
            Diagnostic::DanglingAssignment {
                task_uid,
                resource_uid,
            } => write!(
                f,
                "task {}: resource {} not found, assignment dropped",
                task_uid, resource_uid
            ),
            Diagnostic::AmbiguousField {
                task_uid,
                field,
                value,
            } => write!(f, "task {}: {} '{}' kept verbatim", task_uid, field, value),
            Diagnostic::CyclicLinks { tasks } => {
                let ids: Vec<String> = tasks.iter().map(|t| t.to_string()).collect();
                write!(f, "predecessor cycle: {}", ids.join(" -> "))
            }
        }
    }
}

/// Counts and diagnostics for one import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Task elements in the document
    pub rows_seen: usize,
    /// Rows flagged as blank placeholders
    pub blank_rows: usize,
    /// Tasks that made it into the forest
    pub imported: usize,
    pub links_resolved: usize,
    pub links_dropped: usize,
    pub assignments_dropped: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    /// Number of rows dropped with a `RowSkipped` diagnostic
    pub fn skipped(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::RowSkipped { .. }))
            .count()
    }

    /// Rows that were eligible for import
    pub fn candidates(&self) -> usize {
        self.imported + self.skipped()
    }

    /// One-line summary, e.g. `"9 of 10 tasks imported, 1 links dropped"`
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} of {} tasks imported, {} links dropped",
            self.imported,
            self.candidates(),
            self.links_dropped
        );
        if self.assignments_dropped > 0 {
            line.push_str(&format!(", {} assignments dropped", self.assignments_dropped));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_skipped_rows() {
        let report = ImportReport {
            rows_seen: 5,
            blank_rows: 1,
            imported: 3,
            links_dropped: 2,
            diagnostics: vec![Diagnostic::RowSkipped {
                row: 4,
                uid: None,
                reason: "missing UID".to_string(),
            }],
            ..Default::default()
        };

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.summary(), "3 of 4 tasks imported, 2 links dropped");
    }

    #[test]
    fn summary_mentions_dropped_assignments() {
        let report = ImportReport {
            imported: 2,
            assignments_dropped: 1,
            ..Default::default()
        };

        assert_eq!(
            report.summary(),
            "2 of 2 tasks imported, 0 links dropped, 1 assignments dropped"
        );
    }

    #[test]
    fn diagnostics_serialize_with_kind_tag() {
        let diagnostic = Diagnostic::SelfLink {
            task_uid: "7".to_string(),
        };
        let json = serde_json::to_value(&diagnostic).unwrap();

        assert_eq!(json["kind"], "self_link");
        assert_eq!(json["task_uid"], "7");
        assert!(diagnostic.drops_link());
    }

    #[test]
    fn display_row_skipped() {
        let diagnostic = Diagnostic::RowSkipped {
            row: 3,
            uid: Some("12".to_string()),
            reason: "missing OutlineLevel".to_string(),
        };

        assert_eq!(
            diagnostic.to_string(),
            "row 3 (UID 12) skipped: missing OutlineLevel"
        );
    }
}
