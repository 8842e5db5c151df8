//! Layout of snapshots as the dashboard receives them.

use taskdag::core::{DagSnapshot, GraphModel, TaskId};
use taskdag::layout::{LayoutConfig, LayoutEngine};
use taskdag::{compute_layout, Task};

use crate::fixtures::{diamond_snapshot, edges, test_task};

#[test]
fn test_triangle_levels_and_positions() {
    let tasks = vec![
        test_task(1, "A", 3),
        test_task(2, "B", 3),
        test_task(3, "C", 3),
    ];
    let layout = compute_layout(tasks, edges(&[(1, 2), (2, 3), (1, 3)]));

    assert_eq!(layout.level_of(&TaskId(1)), Some(0));
    assert_eq!(layout.level_of(&TaskId(2)), Some(1));
    assert_eq!(layout.level_of(&TaskId(3)), Some(2));
    assert_eq!(layout.level_count, 3);
    assert!(!layout.has_unresolved());

    let c = layout.node(&TaskId(3)).unwrap();
    assert_eq!(c.x, 50.0);
    assert_eq!(c.y, 50.0 + 2.0 * 180.0);
}

#[test]
fn test_diamond_shares_a_level() {
    let layout = LayoutEngine::default().compute(&GraphModel::from(diamond_snapshot()));

    let levels = layout.levels();
    assert_eq!(levels.len(), 3);
    let middle: Vec<TaskId> = levels[1].iter().map(|n| n.id()).collect();
    assert_eq!(middle, vec![TaskId(2), TaskId(3)]);

    let left = layout.node(&TaskId(2)).unwrap();
    let right = layout.node(&TaskId(3)).unwrap();
    assert_eq!(left.y, right.y);
    assert_eq!(right.x - left.x, 250.0);
}

#[test]
fn test_bounds_cover_every_node() {
    let config = LayoutConfig::default();
    let layout = LayoutEngine::new(config).compute(&GraphModel::from(diamond_snapshot()));

    for node in &layout.nodes {
        assert!(node.x + config.node_width + config.margin <= layout.bounds.width);
        assert!(node.y + config.node_height + config.margin <= layout.bounds.height);
    }
}

#[test]
fn test_dangling_edges_are_ignored() {
    let snapshot = DagSnapshot::new(
        vec![test_task(1, "A", 3), test_task(2, "B", 3)],
        edges(&[(1, 2), (2, 99), (42, 1)]),
    );
    let model = GraphModel::from(snapshot);
    assert_eq!(model.dangling_edges().len(), 2);

    let layout = LayoutEngine::default().compute(&model);
    assert_eq!(layout.nodes.len(), 2);
    assert_eq!(layout.level_of(&TaskId(1)), Some(0));
    assert_eq!(layout.level_of(&TaskId(2)), Some(1));
}

#[test]
fn test_cycle_downstream_lands_on_fallback_level() {
    // 1 -> 2 <-> 3 -> 4
    let tasks: Vec<Task> = (1..=4).map(|i| test_task(i, "t", 3)).collect();
    let layout = compute_layout(tasks, edges(&[(1, 2), (2, 3), (3, 2), (3, 4)]));

    assert_eq!(layout.nodes.len(), 4);
    assert_eq!(layout.level_of(&TaskId(1)), Some(0));
    for id in [2, 3, 4] {
        let node = layout.node(&TaskId(id)).unwrap();
        assert!(node.unresolved);
        assert_eq!(node.level, 1);
    }
    assert_eq!(layout.level_count, 2);
}

#[test]
fn test_snapshot_json_from_backend() {
    let body = r#"{
        "nodes": [
            {"id": 10, "name": "Spec", "status": "completed", "priority": 5},
            {"id": 11, "name": "Build", "status": "in_progress", "priority": 4}
        ],
        "edges": [{"from": 10, "to": 11}]
    }"#;
    let snapshot: DagSnapshot = serde_json::from_str(body).unwrap();
    let layout = LayoutEngine::default().compute(&GraphModel::from(snapshot));

    assert_eq!(layout.level_of(&TaskId(10)), Some(0));
    assert_eq!(layout.level_of(&TaskId(11)), Some(1));
    assert!(layout.node(&TaskId(10)).unwrap().task.is_finished());
}
