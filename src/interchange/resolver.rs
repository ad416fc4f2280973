//! Reference resolution
//!
//! Interchange documents refer to tasks and resources by document-local
//! `UID`s. Resources are resolved as soon as the resource table is known;
//! predecessor links are resolved in a second pass, after every row has been
//! collected, because a task may name a predecessor that appears later in
//! the document.

use std::collections::HashMap;

use tracing::debug;

use super::document::{RawAssignment, ResourceTable};
use super::report::Diagnostic;
use crate::domain::{LinkType, Predecessor, TaskId, TaskRecord};

/// Resource UID written by project tools for "no resource"
const UNASSIGNED_RESOURCE_UID: &str = "-65535";

/// External task UID -> engine task ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierMap {
    map: HashMap<String, TaskId>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mapping; returns false if the external ID was already taken
    pub fn insert(&mut self, external: impl Into<String>, id: TaskId) -> bool {
        use std::collections::hash_map::Entry;

        match self.map.entry(external.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    pub fn get(&self, external: &str) -> Option<&TaskId> {
        self.map.get(external)
    }

    pub fn contains(&self, external: &str) -> bool {
        self.map.contains_key(external)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// External task UID -> resolved resource names, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentTable {
    by_task: HashMap<String, Vec<String>>,
}

impl AssignmentTable {
    /// Resource names assigned to a task
    pub fn names(&self, task_uid: &str) -> &[String] {
        self.by_task
            .get(task_uid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display string for a task's assignments
    pub fn joined(&self, task_uid: &str, separator: &str) -> String {
        self.names(task_uid).join(separator)
    }

    pub fn is_empty(&self) -> bool {
        self.by_task.is_empty()
    }
}

/// Resolves assignments against the resource table
///
/// Assignments to unknown resources are dropped and reported; the
/// "unassigned" placeholder resource is ignored without a diagnostic.
pub fn resolve_assignments(
    assignments: &[RawAssignment],
    resources: &ResourceTable,
) -> (AssignmentTable, Vec<Diagnostic>) {
    let mut table = AssignmentTable::default();
    let mut dropped = Vec::new();

    for assignment in assignments {
        if assignment.resource_uid == UNASSIGNED_RESOURCE_UID {
            continue;
        }

        match resources.get(&assignment.resource_uid) {
            Some(name) => {
                let names = table.by_task.entry(assignment.task_uid.clone()).or_default();
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            None => {
                debug!(
                    task = %assignment.task_uid,
                    resource = %assignment.resource_uid,
                    "Dropping assignment to unknown resource"
                );
                dropped.push(Diagnostic::DanglingAssignment {
                    task_uid: assignment.task_uid.clone(),
                    resource_uid: assignment.resource_uid.clone(),
                });
            }
        }
    }

    (table, dropped)
}

/// A predecessor reference still expressed in document UIDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub predecessor_uid: String,
    /// Numeric type code; `None` means finish-to-start
    pub type_code: Option<String>,
}

/// A collected row waiting for link resolution
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRow {
    pub uid: String,
    pub outline_level: u32,
    pub record: TaskRecord,
    pub links: Vec<PendingLink>,
}

/// Outcome of the link pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkResolution {
    pub resolved: usize,
    pub dropped: Vec<Diagnostic>,
}

fn link_type(code: Option<&str>) -> Option<LinkType> {
    match code.map(str::trim) {
        None | Some("") => Some(LinkType::default()),
        Some(code) => code.parse::<i64>().ok().and_then(LinkType::from_code),
    }
}

/// Resolves every pending link against a complete identifier map
///
/// Dangling, self-referencing, untyped and repeated links are dropped and
/// reported; resolution never fails.
pub fn resolve_links(rows: &mut [PendingRow], identifiers: &IdentifierMap) -> LinkResolution {
    let mut outcome = LinkResolution::default();

    for row in rows.iter_mut() {
        for link in std::mem::take(&mut row.links) {
            let Some(target) = identifiers.get(&link.predecessor_uid) else {
                debug!(task = %row.uid, predecessor = %link.predecessor_uid, "Dropping dangling link");
                outcome.dropped.push(Diagnostic::DanglingPredecessor {
                    task_uid: row.uid.clone(),
                    predecessor_uid: link.predecessor_uid,
                });
                continue;
            };

            if *target == row.record.id {
                outcome.dropped.push(Diagnostic::SelfLink {
                    task_uid: row.uid.clone(),
                });
                continue;
            }

            let Some(link_type) = link_type(link.type_code.as_deref()) else {
                outcome.dropped.push(Diagnostic::UnknownLinkType {
                    task_uid: row.uid.clone(),
                    predecessor_uid: link.predecessor_uid,
                    code: link.type_code.unwrap_or_default(),
                });
                continue;
            };

            if row
                .record
                .add_predecessor(Predecessor::new(target.clone(), link_type))
            {
                outcome.resolved += 1;
            } else {
                outcome.dropped.push(Diagnostic::DuplicateLink {
                    task_uid: row.uid.clone(),
                    predecessor_uid: link.predecessor_uid,
                });
            }
        }
    }

    outcome
}
