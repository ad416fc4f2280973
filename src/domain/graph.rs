//! Predecessor graph for tasks
//!
//! Interchange documents may contain dependency cycles. The importer keeps
//! every resolved link and uses this graph to report cycles rather than
//! rejecting them. Uses petgraph for graph operations.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use super::hierarchy;
use super::id::TaskId;
use super::task::{LinkType, TaskRecord};

/// Directed graph of predecessor links (edges run predecessor -> successor)
#[derive(Debug, Default)]
pub struct PredecessorGraph {
    graph: DiGraph<TaskId, LinkType>,
    node_map: HashMap<TaskId, NodeIndex>,
}

impl PredecessorGraph {
    /// Builds a graph from every task in a forest
    ///
    /// Self-links and links pointing at tasks outside the forest are left
    /// out of the graph.
    pub fn from_forest(forest: &[TaskRecord]) -> Self {
        let mut graph = Self::default();

        // First pass: add all nodes
        hierarchy::visit(forest, &mut |task| graph.add_task(task.id.clone()));

        // Second pass: add all edges
        hierarchy::visit(forest, &mut |task| {
            for link in &task.predecessors {
                graph.add_link(&task.id, &link.task, link.link_type);
            }
        });

        graph
    }

    fn add_task(&mut self, task_id: TaskId) {
        if !self.node_map.contains_key(&task_id) {
            let idx = self.graph.add_node(task_id.clone());
            self.node_map.insert(task_id, idx);
        }
    }

    /// Adds a link: `task` follows `predecessor`
    fn add_link(&mut self, task: &TaskId, predecessor: &TaskId, link_type: LinkType) {
        if task == predecessor {
            return;
        }

        if let (Some(&task_idx), Some(&pred_idx)) =
            (self.node_map.get(task), self.node_map.get(predecessor))
        {
            self.graph.add_edge(pred_idx, task_idx, link_type);
        }
    }

    /// Returns every group of tasks that depend on each other in a loop
    ///
    /// Each cycle lists its tasks in insertion order.
    pub fn cycles(&self) -> Vec<Vec<TaskId>> {
        let mut cycles: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .collect();

        for component in cycles.iter_mut() {
            component.sort();
        }
        cycles.sort();

        cycles
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IdGenerator, Predecessor};

    fn ids(n: usize) -> Vec<TaskId> {
        let mut generator = IdGenerator::new();
        (0..n).map(|i| generator.next_id(&format!("Task {}", i))).collect()
    }

    /// Flat forest where each task lists the given predecessor indices
    fn forest(ids: &[TaskId], links: &[(usize, usize)]) -> Vec<TaskRecord> {
        let mut tasks: Vec<TaskRecord> = ids
            .iter()
            .map(|id| TaskRecord::new(id.clone(), "Task"))
            .collect();
        for &(task, pred) in links {
            tasks[task]
                .predecessors
                .push(Predecessor::new(ids[pred].clone(), LinkType::FinishToStart));
        }
        tasks
    }

    #[test]
    fn empty_forest() {
        let graph = PredecessorGraph::from_forest(&[]);
        assert!(graph.node_map.is_empty());
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn links_become_edges() {
        let ids = ids(2);
        let graph = PredecessorGraph::from_forest(&forest(&ids, &[(1, 0)]));

        assert_eq!(graph.graph.edge_count(), 1);
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn self_and_unknown_links_are_left_out() {
        let ids = ids(3);
        let mut tasks = forest(&ids[..2], &[(0, 0)]);
        tasks[1]
            .predecessors
            .push(Predecessor::new(ids[2].clone(), LinkType::StartToStart));

        let graph = PredecessorGraph::from_forest(&tasks);

        assert_eq!(graph.graph.edge_count(), 0);
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn cycles_are_reported_not_rejected() {
        let ids = ids(4);
        let graph = PredecessorGraph::from_forest(&forest(&ids, &[(1, 0), (2, 1), (0, 2), (3, 2)]));

        assert_eq!(graph.graph.edge_count(), 4);
        assert_eq!(
            graph.cycles(),
            vec![vec![ids[0].clone(), ids[1].clone(), ids[2].clone()]]
        );
    }

    #[test]
    fn from_forest_walks_nested_tasks() {
        let ids = ids(3);
        let mut parent = TaskRecord::new(ids[0].clone(), "Parent");
        let mut first = TaskRecord::new(ids[1].clone(), "First");
        let mut second = TaskRecord::new(ids[2].clone(), "Second");
        second
            .predecessors
            .push(Predecessor::new(ids[1].clone(), LinkType::FinishToStart));
        first
            .predecessors
            .push(Predecessor::new(ids[2].clone(), LinkType::FinishToFinish));
        parent.children = vec![first, second];

        let graph = PredecessorGraph::from_forest(&[parent]);

        assert_eq!(graph.node_map.len(), 3);
        assert_eq!(graph.cycles(), vec![vec![ids[1].clone(), ids[2].clone()]]);
    }
}
