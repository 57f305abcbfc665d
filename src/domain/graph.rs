//! Dependency connectors between visible rows
//!
//! Dependencies are stored between tasks, but only visible rows can be drawn.
//! Each endpoint is resolved to its visible representative: the task itself
//! when it is shown, otherwise the nearest visible ancestor (typically a
//! collapsed group). Uses petgraph to collect the resolved edges.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::hierarchy::Hierarchy;
use super::id::TaskId;
use super::task::Task;

/// Which way a connector runs on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Predecessor row is above the dependent row
    Down,
    /// Predecessor row is below the dependent row
    Up,
}

/// A drawable arrow from a predecessor row to a dependent row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connector {
    /// Visible row standing in for the predecessor
    pub from: TaskId,
    /// Visible row standing in for the dependent
    pub to: TaskId,
    /// Index of `from` among the visible rows
    pub from_row: usize,
    /// Index of `to` among the visible rows
    pub to_row: usize,
    pub direction: Direction,
    /// Number of stored dependencies folded into this arrow
    pub count: usize,
}

/// Finds the row that represents `id` on screen.
///
/// Returns `None` when neither the task nor any ancestor is visible, or the
/// id no longer exists.
pub fn visible_representative(tasks: &[Task], hierarchy: &Hierarchy, id: TaskId) -> Option<TaskId> {
    let mut current = id;
    let mut seen = HashSet::new();

    loop {
        if hierarchy.contains(current) {
            return Some(current);
        }
        if !seen.insert(current) {
            return None;
        }
        current = tasks.iter().find(|t| t.id == current)?.parent_id?;
    }
}

/// Resolved dependency edges over visible rows
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Edge direction is predecessor -> dependent, weighted by folded count
    graph: DiGraph<TaskId, usize>,

    /// Map from visible TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,

    /// Visible row index per node
    rows: HashMap<TaskId, usize>,
}

impl DependencyGraph {
    /// Resolves every stored dependency of every task against the visible
    /// rows. Groups never act as dependents; self-loops after resolution and
    /// orphaned ids are dropped, duplicates are folded into one edge.
    pub fn build(tasks: &[Task], hierarchy: &Hierarchy) -> Self {
        let mut graph = Self::default();

        for (index, row) in hierarchy.rows().iter().enumerate() {
            let node = graph.graph.add_node(row.id);
            graph.node_map.insert(row.id, node);
            graph.rows.insert(row.id, index);
        }

        for dependent in tasks.iter().filter(|t| t.is_task()) {
            if dependent.dependencies.is_empty() {
                continue;
            }
            let Some(to) = visible_representative(tasks, hierarchy, dependent.id) else {
                continue;
            };

            for &dep in &dependent.dependencies {
                let Some(from) = visible_representative(tasks, hierarchy, dep) else {
                    continue;
                };
                if from != to {
                    graph.add_edge(from, to);
                }
            }
        }

        graph
    }

    fn add_edge(&mut self, from: TaskId, to: TaskId) {
        let (Some(&a), Some(&b)) = (self.node_map.get(&from), self.node_map.get(&to)) else {
            return;
        };
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if let Some(count) = self.graph.edge_weight_mut(edge) {
                    *count += 1;
                }
            }
            None => {
                self.graph.add_edge(a, b, 1);
            }
        }
    }

    /// Connectors in the order their first dependency was seen
    pub fn connectors(&self) -> Vec<Connector> {
        self.graph
            .edge_references()
            .filter_map(|edge| {
                let from = *self.graph.node_weight(edge.source())?;
                let to = *self.graph.node_weight(edge.target())?;
                let from_row = *self.rows.get(&from)?;
                let to_row = *self.rows.get(&to)?;
                let direction = if from_row < to_row {
                    Direction::Down
                } else {
                    Direction::Up
                };
                Some(Connector {
                    from,
                    to,
                    from_row,
                    to_row,
                    direction,
                    count: *edge.weight(),
                })
            })
            .collect()
    }

    /// Visible predecessors drawn into a row
    pub fn dependencies(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors(id, petgraph::Direction::Incoming)
    }

    /// Visible rows drawn out of a row
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors(id, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, id: TaskId, direction: petgraph::Direction) -> Vec<TaskId> {
        let Some(&idx) = self.node_map.get(&id) else {
            return vec![];
        };
        let mut ids: Vec<TaskId> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        ids.sort();
        ids
    }

    /// Number of connectors
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskKind;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn id(raw: u64) -> TaskId {
        TaskId::new(raw)
    }

    fn task(raw: u64, parent: Option<u64>, deps: &[u64]) -> Task {
        let mut t = Task::new_task(id(raw), format!("T{}", raw), day(), day(), 1);
        t.parent_id = parent.map(id);
        t.dependencies = deps.iter().copied().map(id).collect();
        t
    }

    fn group(raw: u64, collapsed: bool) -> Task {
        let mut g = Task::new_group(id(raw), format!("G{}", raw), day());
        g.kind = TaskKind::Group { collapsed };
        g
    }

    fn connectors(tasks: &[Task]) -> Vec<Connector> {
        let hierarchy = Hierarchy::derive(tasks);
        DependencyGraph::build(tasks, &hierarchy).connectors()
    }

    #[test]
    fn visible_pair_draws_down() {
        let tasks = vec![task(1, None, &[]), task(2, None, &[1])];
        let result = connectors(&tasks);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].from, id(1));
        assert_eq!(result[0].to, id(2));
        assert_eq!(result[0].direction, Direction::Down);
        assert_eq!((result[0].from_row, result[0].to_row), (0, 1));
    }

    #[test]
    fn predecessor_below_draws_up() {
        let tasks = vec![task(1, None, &[2]), task(2, None, &[])];
        assert_eq!(connectors(&tasks)[0].direction, Direction::Up);
    }

    #[test]
    fn hidden_endpoint_resolves_to_collapsed_group() {
        let tasks = vec![
            group(10, true),
            task(11, Some(10), &[]),
            task(12, None, &[11]),
        ];
        let result = connectors(&tasks);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].from, id(10));
        assert_eq!(result[0].to, id(12));
    }

    #[test]
    fn both_inside_same_collapsed_group_is_suppressed() {
        let tasks = vec![
            group(10, true),
            task(11, Some(10), &[]),
            task(12, Some(10), &[11]),
        ];
        assert!(connectors(&tasks).is_empty());
    }

    #[test]
    fn orphaned_dependency_is_skipped() {
        let tasks = vec![task(1, None, &[99])];
        assert!(connectors(&tasks).is_empty());
    }

    #[test]
    fn groups_are_never_dependents() {
        let mut g = group(10, false);
        g.dependencies = vec![id(1)];
        let tasks = vec![task(1, None, &[]), g];
        assert!(connectors(&tasks).is_empty());
    }

    #[test]
    fn duplicates_fold_into_one_connector() {
        let tasks = vec![
            group(10, true),
            task(11, Some(10), &[]),
            task(12, Some(10), &[]),
            task(13, None, &[11, 12]),
        ];
        let hierarchy = Hierarchy::derive(&tasks);
        let graph = DependencyGraph::build(&tasks, &hierarchy);
        let result = graph.connectors();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].count, 2);
        assert_eq!(graph.dependencies(id(13)), vec![id(10)]);
        assert_eq!(graph.dependents(id(10)), vec![id(13)]);
    }

    #[test]
    fn representative_walks_through_nested_groups() {
        let mut inner = group(20, false);
        inner.parent_id = Some(id(10));
        let tasks = vec![group(10, true), inner, task(21, Some(20), &[])];
        let hierarchy = Hierarchy::derive(&tasks);

        assert_eq!(visible_representative(&tasks, &hierarchy, id(21)), Some(id(10)));
        assert_eq!(visible_representative(&tasks, &hierarchy, id(99)), None);
    }
}
