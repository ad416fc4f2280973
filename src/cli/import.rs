//! Import command

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::output::Output;
use crate::domain::hierarchy;
use crate::interchange::{ImportConfig, Importer};
use crate::storage::TaskStore;

/// Imports a project document and prints the resulting outline
pub fn run(output: &Output, config: ImportConfig, path: &Path, save_to: Option<&Path>) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open project document: {}", path.display()))?;

    let mut progress = |message: &str| debug!(target: "outline_cli::progress", "{}", message);
    let outcome = Importer::new(config)
        .import(BufReader::new(file), &mut progress)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let report = &outcome.report;

    if output.is_json() {
        output.data(&serde_json::json!({
            "project_name": outcome.project_name,
            "report": report,
            "tasks": outcome.forest,
        }));
    } else {
        if let Some(name) = &outcome.project_name {
            println!("Project: {}", name);
            output.blank();
        }

        output.outline(&hierarchy::flatten(&outcome.forest, 0));
        output.blank();
        println!("{}", report.summary());

        if !report.diagnostics.is_empty() {
            println!("Diagnostics:");
            for diagnostic in &report.diagnostics {
                println!("  {}", diagnostic);
            }
        }
    }

    if let Some(target) = save_to {
        let rows = hierarchy::to_flat_list(outcome.forest);
        let count = rows.len();
        TaskStore::new(target).write_all(&rows)?;

        if !output.is_json() {
            output.success(&format!("Wrote {} tasks to {}", count, target.display()));
        }
    }

    Ok(())
}
