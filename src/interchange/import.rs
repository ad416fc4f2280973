//! Import pipeline
//!
//! Parser → reference resolver → field normalizer → hierarchy builder →
//! rollup. Link resolution starts only after every row has been collected.

use std::io::Read;

use tracing::{debug, info};

use super::parser::{collect_rows, parse_document};
use super::progress::{CancelToken, ProgressSink};
use super::report::{Diagnostic, ImportReport};
use super::resolver::{resolve_assignments, resolve_links, IdentifierMap};
use super::{ImportConfig, ImportError};
use crate::domain::{hierarchy, rollup, IdGenerator, PredecessorGraph, TaskRecord};

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Root tasks, each owning its subtree
    pub forest: Vec<TaskRecord>,
    pub project_name: Option<String>,
    pub report: ImportReport,
    /// Document UIDs of imported tasks and the IDs they were given
    pub identifiers: IdentifierMap,
}

/// Imports interchange documents into task forests
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
    cancel: Option<CancelToken>,
}

impl Importer {
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Lets another thread stop the import between rows
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn check_cancel(&self) -> Result<(), ImportError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ImportError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Imports a document from a byte stream
    ///
    /// Document-level failures are returned as errors; a well-formed
    /// document without tasks yields an empty forest. Row and reference
    /// problems are recorded in the report.
    pub fn import<R: Read>(
        &self,
        input: R,
        progress: &mut impl ProgressSink,
    ) -> Result<ImportOutcome, ImportError> {
        progress.report("Reading project document");
        let document = parse_document(input)?;
        self.check_cancel()?;

        let (assignments, assignment_drops) =
            resolve_assignments(&document.assignments, &document.resources);

        let mut ids = IdGenerator::new();
        let collection = collect_rows(
            &document.tasks,
            &assignments,
            &self.config,
            &mut ids,
            progress,
            self.cancel.as_ref(),
        )?;
        self.check_cancel()?;

        let mut rows = collection.rows;
        let identifiers = collection.identifiers;

        progress.report("Resolving predecessor links");
        let links = resolve_links(&mut rows, &identifiers);
        debug!(
            resolved = links.resolved,
            dropped = links.dropped.len(),
            "Resolved predecessor links"
        );

        progress.report("Building outline");
        let records: Vec<TaskRecord> = rows
            .into_iter()
            .map(|row| {
                let mut record = row.record;
                record.indent_level = row.outline_level;
                record
            })
            .collect();
        let imported = records.len();

        let mut forest = hierarchy::build(records);
        rollup::recalculate_forest(&mut forest);

        let mut diagnostics = collection.diagnostics;
        diagnostics.extend(assignment_drops.iter().cloned());
        diagnostics.extend(links.dropped.iter().cloned());
        diagnostics.extend(
            PredecessorGraph::from_forest(&forest)
                .cycles()
                .into_iter()
                .map(|tasks| Diagnostic::CyclicLinks { tasks }),
        );

        let report = ImportReport {
            rows_seen: document.tasks.len(),
            blank_rows: collection.blank_rows,
            imported,
            links_resolved: links.resolved,
            links_dropped: links.dropped.len(),
            assignments_dropped: assignment_drops.len(),
            diagnostics,
        };

        info!(project = ?document.project_name, "{}", report.summary());
        progress.report(&report.summary());

        Ok(ImportOutcome {
            forest,
            project_name: document.project_name,
            report,
            identifiers,
        })
    }
}

/// Imports a document with the default configuration
pub fn import<R: Read>(
    input: R,
    progress: &mut impl ProgressSink,
) -> Result<ImportOutcome, ImportError> {
    Importer::default().import(input, progress)
}
