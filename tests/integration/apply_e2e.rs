//! Creating dependencies against an in-memory backend.

use taskdag::apply::BulkApplier;
use taskdag::client::DependencyService;
use taskdag::core::{GraphModel, TaskId};
use taskdag::layout::LayoutEngine;
use taskdag::{infer_dependencies, Error};

use crate::fixtures::{edges, pairs, test_task, website_tasks, MemoryBackend};

fn chain_tasks() -> Vec<taskdag::Task> {
    (1..=4).map(|i| test_task(i, "step", 3)).collect()
}

#[tokio::test]
async fn test_partial_failure_attempts_everything() {
    let backend = MemoryBackend::new(chain_tasks()).with_edges(edges(&[(2, 3)]));
    let applier = BulkApplier::new(&backend);

    let input = pairs(&[(1, 2), (2, 3), (3, 4)]);
    let summary = applier.apply(&input).await;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(backend.calls(), input);
    assert_eq!(summary.failures[0].detail, "Dependency already exists");
    assert_eq!(summary.to_string(), "2 created, 1 failed");
}

#[tokio::test]
async fn test_cycle_rejected_by_backend() {
    let backend = MemoryBackend::new(chain_tasks());
    let summary = BulkApplier::new(&backend)
        .apply(&pairs(&[(1, 2), (2, 3), (3, 1)]))
        .await;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].predecessor, TaskId(3));
    assert_eq!(summary.failures[0].detail, "This dependency creates a cycle");
    assert_eq!(backend.stored_edges(), edges(&[(1, 2), (2, 3)]));
}

#[tokio::test]
async fn test_transport_error_counts_as_failure() {
    let backend = MemoryBackend::new(chain_tasks()).failing_transport_on(&[(1, 2)]);
    let summary = BulkApplier::new(&backend)
        .apply(&pairs(&[(1, 2), (3, 4)]))
        .await;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert!(summary.failures[0].detail.contains("connection reset"));
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_bulk_self_pair_is_left_to_backend() {
    let backend = MemoryBackend::new(chain_tasks());
    let summary = BulkApplier::new(&backend).apply(&pairs(&[(2, 2)])).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(backend.calls(), pairs(&[(2, 2)]));
}

#[tokio::test]
async fn test_manual_self_pair_never_reaches_backend() {
    let backend = MemoryBackend::new(chain_tasks());
    let result = BulkApplier::new(&backend)
        .create_one(TaskId(2), TaskId(2))
        .await;

    match result {
        Err(e @ Error::SelfDependency(_)) => assert!(e.is_local_validation()),
        other => panic!("expected self-dependency error, got {:?}", other),
    }
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_manual_unknown_task() {
    let backend = MemoryBackend::new(chain_tasks());
    let result = BulkApplier::new(&backend)
        .create_one(TaskId(1), TaskId(77))
        .await;
    assert!(matches!(result, Err(Error::Api { status: 404, .. })));
}

#[tokio::test]
async fn test_infer_apply_then_layout() {
    let backend = MemoryBackend::new(website_tasks());
    let suggestions = infer_dependencies(&website_tasks());

    let summary = BulkApplier::new(&backend)
        .apply_suggestions(&suggestions)
        .await;
    assert!(summary.is_complete_success());
    assert_eq!(summary.succeeded, suggestions.len());

    let snapshot = backend.fetch_dag(1).await.unwrap();
    let layout = LayoutEngine::default().compute(&GraphModel::from(snapshot));

    let levels: Vec<usize> = (1..=6)
        .map(|id| layout.level_of(&TaskId(id)).unwrap())
        .collect();
    assert_eq!(levels, vec![0, 1, 2, 0, 3, 4]);
    assert!(!layout.has_unresolved());
}
