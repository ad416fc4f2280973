//! Outline hierarchy
//!
//! Converts between the flat, order-indexed task list that callers persist
//! and the owned forest used for editing and display.
//!
//! - [`build`] groups a flat list into a forest using `indent_level`
//! - [`flatten`] walks a forest back into display rows, honouring
//!   `is_expanded`
//! - [`to_flat_list`] flattens everything for persistence

use std::collections::BTreeMap;

use super::task::TaskRecord;

/// Builds a forest from a flat list sorted by `order_index`
///
/// Each task's parent is the most recent task seen at the nearest lower
/// indent level, so indent jumps greater than one attach to the closest
/// available ancestor. Input order is trusted; the list is not re-sorted.
/// Children already present on the input records are discarded.
pub fn build(tasks: Vec<TaskRecord>) -> Vec<TaskRecord> {
    let mut levels: BTreeMap<u32, usize> = BTreeMap::new();
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(tasks.len());

    for (index, task) in tasks.iter().enumerate() {
        // Entries at or below this depth can no longer be ancestors
        levels.split_off(&task.indent_level);
        parents.push(levels.values().next_back().copied());
        levels.insert(task.indent_level, index);
    }

    // Children always follow their parent, so a reverse pass sees every
    // subtree complete before its parent is assembled.
    let mut pending: Vec<Vec<TaskRecord>> = tasks.iter().map(|_| Vec::new()).collect();
    let mut roots = Vec::new();

    for (index, mut task) in tasks.into_iter().enumerate().rev() {
        let mut children = std::mem::take(&mut pending[index]);
        children.reverse();
        task.is_group = !children.is_empty();
        task.children = children;

        match parents[index] {
            Some(parent) => pending[parent].push(task),
            None => roots.push(task),
        }
    }

    roots.reverse();
    roots
}

/// Flattens a forest into display rows
///
/// Every emitted row gets its depth (offset by `start_level`) as
/// `indent_level`. Children of collapsed nodes are skipped; the forest itself
/// is left untouched.
pub fn flatten(forest: &[TaskRecord], start_level: u32) -> Vec<TaskRecord> {
    let mut rows = Vec::new();
    flatten_into(forest, start_level, &mut rows);
    rows
}

fn flatten_into(nodes: &[TaskRecord], level: u32, rows: &mut Vec<TaskRecord>) {
    for node in nodes {
        let mut row = node.detached();
        row.indent_level = level;
        rows.push(row);

        if node.is_expanded {
            flatten_into(&node.children, level + 1, rows);
        }
    }
}

/// Flattens every node for persistence, ignoring expansion state
///
/// Indent levels are recomputed from depth and `order_index` is renumbered
/// sequentially in outline order.
pub fn to_flat_list(forest: Vec<TaskRecord>) -> Vec<TaskRecord> {
    let mut rows = Vec::new();
    let mut stack: Vec<(TaskRecord, u32)> = forest.into_iter().rev().map(|t| (t, 0)).collect();

    while let Some((mut node, level)) = stack.pop() {
        let children = std::mem::take(&mut node.children);
        stack.extend(children.into_iter().rev().map(|c| (c, level + 1)));

        node.indent_level = level;
        node.order_index = rows.len() as u64;
        rows.push(node);
    }

    rows
}

/// Counts all descendants of a node
pub fn descendant_count(node: &TaskRecord) -> usize {
    node.children
        .iter()
        .map(|child| 1 + descendant_count(child))
        .sum()
}

/// Visits every node depth-first, parents before children
pub fn visit<'a>(forest: &'a [TaskRecord], f: &mut impl FnMut(&'a TaskRecord)) {
    for node in forest {
        f(node);
        visit(&node.children, f);
    }
}

/// Applies `f` to every node depth-first, parents before children
pub fn visit_mut(forest: &mut [TaskRecord], f: &mut impl FnMut(&mut TaskRecord)) {
    for node in forest.iter_mut() {
        f(node);
        visit_mut(&mut node.children, f);
    }
}

/// Counts all nodes in a forest
pub fn node_count(forest: &[TaskRecord]) -> usize {
    forest.iter().map(|node| 1 + descendant_count(node)).sum()
}
