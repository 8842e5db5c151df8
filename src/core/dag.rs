//! Task dependency graph.
//!
//! `GraphModel` is an immutable snapshot of a project's tasks and the
//! "must finish before" edges between them. It is rebuilt from scratch on
//! every fetch; there is no incremental update API.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::{has_path_connecting, is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::task::{DependencyEdge, Task, TaskId};
use crate::error::{Error, Result};

/// The DAG payload returned by the backend for one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DagSnapshot {
    #[serde(default)]
    pub nodes: Vec<Task>,
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

impl DagSnapshot {
    pub fn new(nodes: Vec<Task>, edges: Vec<DependencyEdge>) -> Self {
        Self { nodes, edges }
    }
}

/// Adjacency view over a task snapshot.
///
/// Nodes keep the order in which tasks were supplied. Edges whose endpoints
/// are unknown are set aside in [`GraphModel::dangling_edges`] and have no
/// effect on the graph.
pub struct GraphModel {
    graph: DiGraph<Task, ()>,
    task_index: HashMap<TaskId, NodeIndex>,
    edges: Vec<DependencyEdge>,
    dangling: Vec<DependencyEdge>,
}

impl GraphModel {
    /// Build a model from a task list and an edge list.
    ///
    /// A task whose id was already seen is ignored (first occurrence wins).
    pub fn from_parts(tasks: Vec<Task>, edges: Vec<DependencyEdge>) -> Self {
        let mut graph = DiGraph::with_capacity(tasks.len(), edges.len());
        let mut task_index = HashMap::with_capacity(tasks.len());

        for task in tasks {
            if task_index.contains_key(&task.id) {
                debug!(task_id = %task.id, "duplicate task in snapshot ignored");
                continue;
            }
            let id = task.id;
            let index = graph.add_node(task);
            task_index.insert(id, index);
        }

        let mut accepted = Vec::with_capacity(edges.len());
        let mut dangling = Vec::new();
        for edge in edges {
            match (
                task_index.get(&edge.predecessor),
                task_index.get(&edge.successor),
            ) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, ());
                    accepted.push(edge);
                }
                _ => {
                    warn!(%edge, "skipping edge with unknown endpoint");
                    dangling.push(edge);
                }
            }
        }

        debug!(
            tasks = graph.node_count(),
            edges = accepted.len(),
            dangling = dangling.len(),
            "graph model built"
        );

        Self {
            graph,
            task_index,
            edges: accepted,
            dangling,
        }
    }

    pub fn from_snapshot(snapshot: DagSnapshot) -> Self {
        Self::from_parts(snapshot.nodes, snapshot.edges)
    }

    /// Get a reference to a task by its ID.
    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.task_index
            .get(id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.task_index.contains_key(id)
    }

    /// All tasks, in the order they were supplied.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    /// Edges that made it into the graph, in input order.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Edges skipped because one of their endpoints is not a known task.
    pub fn dangling_edges(&self) -> &[DependencyEdge] {
        &self.dangling
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn has_dependency(&self, from: &TaskId, to: &TaskId) -> bool {
        match (self.task_index.get(from), self.task_index.get(to)) {
            (Some(&from_idx), Some(&to_idx)) => self.graph.find_edge(from_idx, to_idx).is_some(),
            _ => false,
        }
    }

    /// Direct successors of a task, in edge input order.
    ///
    /// A successor appears once per edge, so parallel edges repeat it.
    pub fn successors(&self, id: &TaskId) -> Vec<TaskId> {
        match self.task_index.get(id) {
            Some(&index) => self
                .successor_indices(index)
                .into_iter()
                .map(|i| self.graph[i].id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct predecessors of a task, in edge input order.
    pub fn predecessors(&self, id: &TaskId) -> Vec<TaskId> {
        match self.task_index.get(id) {
            Some(&index) => {
                let mut preds: Vec<TaskId> = self
                    .graph
                    .neighbors_directed(index, Direction::Incoming)
                    .map(|i| self.graph[i].id)
                    .collect();
                preds.reverse();
                preds
            }
            None => Vec::new(),
        }
    }

    /// Number of edges whose successor is `id`. Unknown ids have in-degree 0.
    pub fn in_degree(&self, id: &TaskId) -> usize {
        self.task_index
            .get(id)
            .map(|&index| {
                self.graph
                    .edges_directed(index, Direction::Incoming)
                    .count()
            })
            .unwrap_or(0)
    }

    /// In-degree of every task.
    pub fn in_degrees(&self) -> HashMap<TaskId, usize> {
        self.tasks().map(|t| (t.id, self.in_degree(&t.id))).collect()
    }

    /// Some task on a cycle, if the edge set is not acyclic.
    pub fn find_cycle(&self) -> Option<TaskId> {
        toposort(&self.graph, None)
            .err()
            .map(|cycle| self.graph[cycle.node_id()].id)
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Whether adding `predecessor -> successor` would close a cycle.
    ///
    /// # Errors
    /// Returns `Error::TaskNotFound` if either task is unknown.
    pub fn would_create_cycle(&self, predecessor: &TaskId, successor: &TaskId) -> Result<bool> {
        let from = *self
            .task_index
            .get(predecessor)
            .ok_or(Error::TaskNotFound(*predecessor))?;
        let to = *self
            .task_index
            .get(successor)
            .ok_or(Error::TaskNotFound(*successor))?;

        if from == to {
            return Ok(true);
        }
        Ok(has_path_connecting(&self.graph, to, from, None))
    }

    /// Tasks in an order that respects every edge, preferring higher priority.
    ///
    /// Among tasks whose predecessors are all placed, the highest priority goes
    /// first; ties keep input order. Tasks left on a cycle are appended at the
    /// end in input order.
    pub fn execution_order(&self) -> Vec<&Task> {
        let mut remaining: Vec<usize> = self
            .graph
            .node_indices()
            .map(|i| self.graph.edges_directed(i, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<(u8, Reverse<usize>)> = self
            .graph
            .node_indices()
            .filter(|i| remaining[i.index()] == 0)
            .map(|i| (self.graph[i].priority, Reverse(i.index())))
            .collect();

        let mut placed = vec![false; self.graph.node_count()];
        let mut order = Vec::with_capacity(self.graph.node_count());

        while let Some((_, Reverse(position))) = ready.pop() {
            let index = NodeIndex::new(position);
            placed[position] = true;
            order.push(&self.graph[index]);

            for next in self.successor_indices(index) {
                let slot = &mut remaining[next.index()];
                *slot = slot.saturating_sub(1);
                if *slot == 0 && !placed[next.index()] {
                    ready.push((self.graph[next].priority, Reverse(next.index())));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            warn!(
                unplaced = self.graph.node_count() - order.len(),
                "execution order incomplete, dependency cycle present"
            );
            order.extend(
                self.graph
                    .node_indices()
                    .filter(|i| !placed[i.index()])
                    .map(|i| &self.graph[i]),
            );
        }

        order
    }

    pub(crate) fn graph(&self) -> &DiGraph<Task, ()> {
        &self.graph
    }

    /// petgraph lists neighbors newest edge first; flip to input order.
    pub(crate) fn successor_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        next.reverse();
        next
    }
}

impl From<DagSnapshot> for GraphModel {
    fn from(snapshot: DagSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

impl std::fmt::Debug for GraphModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphModel")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .field("dangling", &self.dangling.len())
            .finish()
    }
}
