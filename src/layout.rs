//! Layered layout of the task graph.
//!
//! Levels come from Kahn's algorithm run frontier by frontier: level 0 holds
//! tasks with no predecessors, and a task joins level `k + 1` when its last
//! predecessor was placed in level `k`. Within a level, tasks keep the order
//! in which the frontier discovered them; no crossing minimisation is done.
//!
//! Tasks that are never released (they sit on a cycle, or downstream of one)
//! are placed together on one extra level after the last real one and flagged
//! as unresolved, so every input task is always drawn.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{DependencyEdge, GraphModel, Task, TaskId};

/// Box and spacing sizes, in abstract layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between neighbouring nodes on the same level.
    pub horizontal_gap: f64,
    /// Gap between consecutive levels.
    pub vertical_gap: f64,
    /// Space around the drawing.
    pub margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 80.0,
            horizontal_gap: 50.0,
            vertical_gap: 100.0,
            margin: 50.0,
        }
    }
}

/// A task with its level and top-left coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredNode {
    #[serde(flatten)]
    pub task: Task,
    pub level: usize,
    pub x: f64,
    pub y: f64,
    /// Set when the task could not be levelled and sits on the fallback level.
    #[serde(default)]
    pub unresolved: bool,
}

impl LayeredNode {
    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// Canvas size needed to draw every node with the configured margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Right-most and bottom-most node edge, plus the margin.
    ///
    /// An empty node list yields a zero-sized box.
    pub fn from_nodes(nodes: &[LayeredNode], config: &LayoutConfig) -> Self {
        if nodes.is_empty() {
            return Self::default();
        }
        let max_x = nodes.iter().map(|n| n.x).fold(f64::MIN, f64::max);
        let max_y = nodes.iter().map(|n| n.y).fold(f64::MIN, f64::max);
        Self {
            width: max_x + config.node_width + config.margin,
            height: max_y + config.node_height + config.margin,
        }
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// One entry per task: level by level, discovery order within a level.
    pub nodes: Vec<LayeredNode>,
    pub bounds: BoundingBox,
    /// Number of levels, the fallback level included.
    pub level_count: usize,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &TaskId) -> Option<&LayeredNode> {
        self.nodes.iter().find(|n| n.task.id == *id)
    }

    pub fn level_of(&self, id: &TaskId) -> Option<usize> {
        self.node(id).map(|n| n.level)
    }

    /// Nodes grouped by level.
    pub fn levels(&self) -> Vec<Vec<&LayeredNode>> {
        let mut levels: Vec<Vec<&LayeredNode>> = vec![Vec::new(); self.level_count];
        for node in &self.nodes {
            levels[node.level].push(node);
        }
        levels
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &LayeredNode> + '_ {
        self.nodes.iter().filter(|n| n.unresolved)
    }

    pub fn has_unresolved(&self) -> bool {
        self.nodes.iter().any(|n| n.unresolved)
    }
}

/// Computes layered layouts with a fixed box size and spacing.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Level and position every task of the model.
    pub fn compute(&self, model: &GraphModel) -> Layout {
        if model.is_empty() {
            return Layout::default();
        }

        let graph = model.graph();
        let count = graph.node_count();

        let mut remaining: Vec<usize> = graph
            .node_indices()
            .map(|i| model.in_degree(&graph[i].id))
            .collect();
        let mut levelled = vec![false; count];

        let mut frontier: Vec<_> = graph
            .node_indices()
            .filter(|i| remaining[i.index()] == 0)
            .collect();
        if frontier.is_empty() {
            warn!(tasks = count, "no task without predecessors, every task is unresolved");
        }

        let mut buckets = Vec::new();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &index in &frontier {
                levelled[index.index()] = true;
                for succ in model.successor_indices(index) {
                    let slot = &mut remaining[succ.index()];
                    *slot = slot.saturating_sub(1);
                    if *slot == 0 && !levelled[succ.index()] {
                        next.push(succ);
                    }
                }
            }
            buckets.push(frontier);
            frontier = next;
        }

        let stuck: Vec<_> = graph
            .node_indices()
            .filter(|i| !levelled[i.index()])
            .collect();
        let resolved_levels = buckets.len();
        if !stuck.is_empty() {
            warn!(
                unresolved = stuck.len(),
                fallback_level = resolved_levels,
                "dependency cycle left tasks unlevelled"
            );
        }

        let mut nodes = Vec::with_capacity(count);
        for (level, bucket) in buckets.iter().enumerate() {
            for (slot, &index) in bucket.iter().enumerate() {
                nodes.push(self.place(graph[index].clone(), level, slot, false));
            }
        }
        for (slot, &index) in stuck.iter().enumerate() {
            nodes.push(self.place(graph[index].clone(), resolved_levels, slot, true));
        }

        let level_count = resolved_levels + usize::from(!stuck.is_empty());
        let bounds = BoundingBox::from_nodes(&nodes, &self.config);
        debug!(
            nodes = nodes.len(),
            levels = level_count,
            width = bounds.width,
            height = bounds.height,
            "layout computed"
        );

        Layout {
            nodes,
            bounds,
            level_count,
        }
    }

    fn place(&self, task: Task, level: usize, slot: usize, unresolved: bool) -> LayeredNode {
        let c = &self.config;
        LayeredNode {
            task,
            level,
            x: c.margin + slot as f64 * (c.node_width + c.horizontal_gap),
            y: c.margin + level as f64 * (c.node_height + c.vertical_gap),
            unresolved,
        }
    }
}

/// Build a graph from `tasks` and `edges` and lay it out with default sizes.
pub fn compute_layout(tasks: Vec<Task>, edges: Vec<DependencyEdge>) -> Layout {
    LayoutEngine::default().compute(&GraphModel::from_parts(tasks, edges))
}
