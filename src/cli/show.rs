//! Show command: redisplay a stored flat task list

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::output::Output;
use crate::domain::{hierarchy, rollup, TaskId};
use crate::storage::TaskStore;

/// Options for redisplaying a stored list
#[derive(Debug, Default)]
pub struct ShowOptions<'a> {
    /// Group IDs to collapse before flattening
    pub collapse: &'a [String],
    /// Recompute group dates and spans from their children
    pub rollup: bool,
    /// Write the list back, keeping expansion state
    pub save: bool,
}

pub fn run(output: &Output, path: &Path, options: ShowOptions<'_>) -> Result<()> {
    let store = TaskStore::new(path);
    if !store.path().exists() {
        bail!("Task list not found: {}", path.display());
    }

    let tasks = store.read_all()?;
    debug!(count = tasks.len(), "Loaded task list");

    let mut forest = hierarchy::build(tasks);

    if options.rollup {
        rollup::recalculate_forest(&mut forest);
    }

    let mut collapse = HashSet::new();
    for raw in options.collapse {
        let id: TaskId = raw
            .parse()
            .with_context(|| format!("Invalid task ID: {}", raw))?;
        collapse.insert(id);
    }

    let mut found = HashSet::new();
    hierarchy::visit_mut(&mut forest, &mut |task| {
        if collapse.contains(&task.id) {
            task.is_expanded = false;
            found.insert(task.id.clone());
        }
    });

    if let Some(missing) = collapse.iter().find(|id| !found.contains(*id)) {
        bail!("Task not found: {}", missing);
    }

    let rows = hierarchy::flatten(&forest, 0);
    debug!(
        total = hierarchy::node_count(&forest),
        visible = rows.len(),
        "Flattened outline"
    );

    if output.is_json() {
        output.data(&rows);
    } else {
        output.outline(&rows);
    }

    if options.save {
        store.write_all(&hierarchy::to_flat_list(forest))?;
        if !output.is_json() {
            output.success(&format!("Saved {}", path.display()));
        }
    }

    Ok(())
}
