//! Interchange document parser
//!
//! Reads an MS Project XML document in two steps:
//!
//! 1. [`parse_document`] turns the byte stream into an element tree and
//!    extracts the raw project name, resource table, assignment table and
//!    task rows. Only document-level problems fail here.
//! 2. [`collect_rows`] converts raw rows into pending task records, issuing
//!    engine IDs and normalizing fields. Bad rows are skipped with a
//!    diagnostic.

use std::io::Read;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use super::document::{InterchangeDocument, RawAssignment, RawLink, RawTaskRow};
use super::progress::{CancelToken, ProgressSink};
use super::report::Diagnostic;
use super::resolver::{AssignmentTable, IdentifierMap, PendingLink, PendingRow};
use super::{ImportConfig, ImportError};
use crate::domain::fields::{self, ScheduleSource};
use crate::domain::{IdGenerator, TaskRecord};

const ROOT_ELEMENT: &str = "Project";

/// Deepest element nesting accepted; project documents need a handful
const MAX_DEPTH: usize = 64;

/// A parsed XML element; namespaces are dropped from names
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of a child element, `None` when absent or blank
    fn value(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|c| c.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    fn flag(&self, name: &str) -> bool {
        matches!(self.value(name).as_deref(), Some("1") | Some("true"))
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), ImportError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ImportError::Format("document has more than one root element".to_string())),
    }
}

fn check_root(stack: &[Element], root: &Option<Element>, element: &Element) -> Result<(), ImportError> {
    if stack.is_empty() && root.is_none() && element.name != ROOT_ELEMENT {
        return Err(ImportError::Format(format!(
            "expected root element <{}>, found <{}>",
            ROOT_ELEMENT, element.name
        )));
    }
    Ok(())
}

fn check_depth(stack: &[Element]) -> Result<(), ImportError> {
    if stack.len() >= MAX_DEPTH {
        return Err(ImportError::Format(format!(
            "elements nested deeper than {} levels",
            MAX_DEPTH
        )));
    }
    Ok(())
}

fn read_tree(bytes: &[u8]) -> Result<Element, ImportError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ImportError::Format(format!("malformed XML: {}", e)))?;

        match event {
            Event::Start(start) => {
                check_depth(&stack)?;
                let element = Element::from_start(&start);
                check_root(&stack, &root, &element)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                check_depth(&stack)?;
                let element = Element::from_start(&start);
                check_root(&stack, &root, &element)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ImportError::Format("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| ImportError::Format(format!("malformed XML text: {}", e)))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ImportError::Format("unexpected end of document".to_string()));
    }

    root.ok_or_else(|| ImportError::Format("document has no root element".to_string()))
}

fn parse_task(position: usize, element: &Element) -> RawTaskRow {
    RawTaskRow {
        position,
        uid: element.value("UID"),
        name: element.value("Name"),
        outline_level: element.value("OutlineLevel"),
        start: element.value("Start"),
        finish: element.value("Finish"),
        duration: element.value("Duration"),
        work: element.value("Work"),
        percent_complete: element.value("PercentComplete"),
        priority: element.value("Priority"),
        is_null: element.flag("IsNull"),
        links: element
            .children_named("PredecessorLink")
            .map(|link| RawLink {
                predecessor_uid: link.value("PredecessorUID"),
                type_code: link.value("Type"),
            })
            .collect(),
    }
}

/// Reads a project document from a byte stream
///
/// Fails when the stream cannot be read, the XML is malformed, or the root
/// element is not `<Project>`. Missing `Tasks`, `Resources` or
/// `Assignments` sections simply produce empty tables.
pub fn parse_document<R: Read>(mut input: R) -> Result<InterchangeDocument, ImportError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;

    let root = read_tree(&bytes)?;
    let mut document = InterchangeDocument {
        project_name: root.value("Name").or_else(|| root.value("Title")),
        ..Default::default()
    };

    if let Some(resources) = root.child("Resources") {
        for resource in resources.children_named("Resource") {
            if let (Some(uid), Some(name)) = (resource.value("UID"), resource.value("Name")) {
                document.resources.insert(uid, name);
            }
        }
    }

    if let Some(assignments) = root.child("Assignments") {
        for assignment in assignments.children_named("Assignment") {
            if let (Some(task_uid), Some(resource_uid)) =
                (assignment.value("TaskUID"), assignment.value("ResourceUID"))
            {
                document.assignments.push(RawAssignment {
                    task_uid,
                    resource_uid,
                });
            }
        }
    }

    if let Some(tasks) = root.child("Tasks") {
        document.tasks = tasks
            .children_named("Task")
            .enumerate()
            .map(|(i, task)| parse_task(i + 1, task))
            .collect();
    }

    if document.project_name.is_none() {
        document.project_name = document
            .tasks
            .iter()
            .find(|t| t.is_project_summary())
            .and_then(|t| t.name.clone());
    }

    debug!(
        tasks = document.tasks.len(),
        resources = document.resources.len(),
        assignments = document.assignments.len(),
        "Parsed interchange document"
    );

    Ok(document)
}

/// Rows converted into pending records, plus what happened on the way
#[derive(Debug, Default)]
pub struct RowCollection {
    pub rows: Vec<PendingRow>,
    pub identifiers: IdentifierMap,
    pub blank_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl RowCollection {
    fn skip(
        &mut self,
        row: &RawTaskRow,
        reason: &str,
        total: usize,
        progress: &mut impl ProgressSink,
    ) {
        let diagnostic = Diagnostic::RowSkipped {
            row: row.position,
            uid: row.uid.clone(),
            reason: reason.to_string(),
        };
        warn!("{}", diagnostic);
        progress.report(&format!("Skipped row {} of {}: {}", row.position, total, reason));
        self.diagnostics.push(diagnostic);
    }

    fn ambiguous(&mut self, uid: &str, field: &str, value: &str) {
        self.diagnostics.push(Diagnostic::AmbiguousField {
            task_uid: uid.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

fn parse_percent(raw: &str) -> Option<u8> {
    let value: f64 = raw.trim().parse().ok()?;
    value
        .is_finite()
        .then(|| value.round().clamp(0.0, 100.0) as u8)
}

/// Converts raw rows into pending records
///
/// Blank placeholder rows are skipped silently. When the project summary row
/// is skipped (see [`ImportConfig::skip_project_summary`]) every other
/// outline level is shifted up by one so top-level tasks land at level 0.
/// Predecessor links are only collected here; they are resolved once every
/// row has an engine ID.
pub fn collect_rows(
    tasks: &[RawTaskRow],
    assignments: &AssignmentTable,
    config: &ImportConfig,
    ids: &mut IdGenerator,
    progress: &mut impl ProgressSink,
    cancel: Option<&CancelToken>,
) -> Result<RowCollection, ImportError> {
    let mut collection = RowCollection::default();
    let total = tasks.len();

    let shift = if config.skip_project_summary && tasks.iter().any(RawTaskRow::is_project_summary) {
        1
    } else {
        0
    };

    for row in tasks {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ImportError::Cancelled);
        }

        if row.is_null {
            collection.blank_rows += 1;
            progress.report(&format!("Skipped blank row {} of {}", row.position, total));
            continue;
        }

        if config.skip_project_summary && row.is_project_summary() {
            debug!("Skipping project summary row");
            progress.report(&format!("Skipped project summary row {} of {}", row.position, total));
            continue;
        }

        let Some(uid) = row.uid.clone() else {
            collection.skip(row, "missing UID", total, progress);
            continue;
        };

        let outline_level = match row.outline_level.as_deref().map(str::parse::<u32>) {
            Some(Ok(level)) => level.saturating_sub(shift),
            Some(Err(_)) => {
                collection.skip(row, "invalid OutlineLevel", total, progress);
                continue;
            }
            None => {
                collection.skip(row, "missing OutlineLevel", total, progress);
                continue;
            }
        };

        if collection.identifiers.contains(&uid) {
            collection.skip(row, "duplicate UID", total, progress);
            continue;
        }

        let name = row
            .name
            .clone()
            .unwrap_or_else(|| config.placeholder_name.clone());
        let id = ids.next_id(&name);
        collection.identifiers.insert(uid.clone(), id.clone());

        let mut record = TaskRecord::new(id, name).at(outline_level, collection.rows.len() as u64);
        record.legacy_id = Some(uid.clone());

        let schedule = fields::resolve_schedule(
            row.start.as_deref(),
            row.finish.as_deref(),
            row.work_duration(),
            config.hours_per_day,
        );
        if schedule.source != ScheduleSource::Given {
            debug!(uid = %uid, source = ?schedule.source, "Applied date fallback");
        }
        record.start_date = schedule.start;
        record.finish_date = schedule.finish;

        if let Some(duration) = row.work_duration() {
            record.duration_display = fields::format_duration(duration, config.hours_per_day);
            if fields::parse_duration_hours(duration).is_none()
                || schedule.source == ScheduleSource::OutOfRange
            {
                collection.ambiguous(&uid, "Duration", duration);
            }
        }

        if let Some(priority) = row.priority.as_deref() {
            record.priority = fields::format_priority(priority);
            if !record.priority.is_mapped() {
                collection.ambiguous(&uid, "Priority", priority);
            }
        }

        if let Some(percent) = row.percent_complete.as_deref() {
            match parse_percent(percent) {
                Some(value) => record.percent_complete = value,
                None => collection.ambiguous(&uid, "PercentComplete", percent),
            }
        }

        record.assigned_to = assignments.joined(&uid, &config.assignment_separator);

        let links = row
            .links
            .iter()
            .filter_map(|link| {
                Some(PendingLink {
                    predecessor_uid: link.predecessor_uid.clone()?,
                    type_code: link.type_code.clone(),
                })
            })
            .collect();

        progress.report(&format!("Parsed task {} of {}: {}", row.position, total, record.name));

        collection.rows.push(PendingRow {
            uid,
            outline_level,
            record,
            links,
        });
    }

    Ok(collection)
}
