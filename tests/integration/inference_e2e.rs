//! Inference over project-shaped task lists.

use std::collections::HashSet;

use taskdag::core::{GraphModel, TaskId};
use taskdag::inference::{InferenceEngine, PhaseRule, PhaseRules, RuleSet};
use taskdag::{infer_dependencies, Confidence, DependencyEdge, Error, Task};

use crate::fixtures::website_tasks;

fn ids(raw: &[(i64, i64)]) -> Vec<(TaskId, TaskId)> {
    raw.iter().map(|&(a, b)| (TaskId(a), TaskId(b))).collect()
}

#[test]
fn test_three_phase_project() {
    let tasks = vec![
        Task::new(1, "Requirements analysis"),
        Task::new(2, "Wireframe mockups"),
        Task::new(3, "Backend implementation"),
    ];
    let suggestions = infer_dependencies(&tasks);

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].pair(), (TaskId(1), TaskId(2)));
    assert_eq!(suggestions[0].reason, "Planning should complete before Design");
    assert_eq!(suggestions[0].confidence, Confidence::High);
    assert_eq!(suggestions[1].pair(), (TaskId(2), TaskId(3)));
    assert_eq!(suggestions[1].reason, "Design should complete before Development");
}

#[test]
fn test_website_project_suggestions() {
    let suggestions = infer_dependencies(&website_tasks());
    let pairs: Vec<_> = suggestions.iter().map(|s| s.pair()).collect();

    assert_eq!(
        pairs,
        ids(&[(1, 2), (2, 3), (4, 5), (5, 6), (3, 5), (4, 3)])
    );
    assert!(suggestions[..4].iter().all(|s| s.confidence == Confidence::High));
    assert_eq!(
        suggestions[5].reason,
        "Backend API produces outputs needed by Frontend Development"
    );
    assert_eq!(suggestions[5].confidence, Confidence::Medium);
}

#[test]
fn test_website_suggestions_form_a_dag() {
    let tasks = website_tasks();
    let edges: Vec<DependencyEdge> = infer_dependencies(&tasks)
        .iter()
        .map(|s| DependencyEdge::from(s.pair()))
        .collect();
    let model = GraphModel::from_parts(tasks, edges);
    assert!(model.is_acyclic());

    let order: Vec<TaskId> = model.execution_order().iter().map(|t| t.id).collect();
    assert_eq!(order.first(), Some(&TaskId(1)));
    assert_eq!(order.last(), Some(&TaskId(6)));
}

#[test]
fn test_inference_is_deterministic() {
    let tasks = website_tasks();
    let first = infer_dependencies(&tasks);
    for _ in 0..5 {
        assert_eq!(infer_dependencies(&tasks), first);
    }
}

#[test]
fn test_no_duplicates_or_self_pairs() {
    let mut tasks = website_tasks();
    // same id twice, as a sloppy client might send
    tasks.push(Task::new(3, "Frontend Development").with_skills(["frontend"]));

    let suggestions = infer_dependencies(&tasks);
    let mut seen = HashSet::new();
    for s in &suggestions {
        assert_ne!(s.predecessor.id, s.successor.id);
        assert!(seen.insert(s.pair()), "duplicate pair {:?}", s.pair());
    }
}

#[test]
fn test_too_few_tasks() {
    let one = vec![Task::new(1, "Requirements")];
    assert!(infer_dependencies(&one).is_empty());
    assert!(infer_dependencies(&[]).is_empty());
    assert!(matches!(
        InferenceEngine::ensure_enough_tasks(&one),
        Err(Error::NotEnoughTasks { found: 1 })
    ));
}

#[test]
fn test_custom_rules_from_toml() {
    let rules: RuleSet = toml::from_str(
        r#"
        [[phases]]
        phase = 1
        name = "Research"
        keywords = ["survey"]

        [[phases]]
        phase = 2
        name = "Writing"
        keywords = ["draft"]
        "#,
    )
    .unwrap();
    assert_eq!(
        rules.phases,
        PhaseRules(vec![
            PhaseRule::new(1, "Research", &["survey"]),
            PhaseRule::new(2, "Writing", &["draft"]),
        ])
    );

    let tasks = vec![
        Task::new(1, "Draft chapter").with_priority(1),
        Task::new(2, "Survey literature").with_priority(1),
    ];
    let suggestions = InferenceEngine::new(rules).infer(&tasks);
    assert_eq!(suggestions[0].pair(), (TaskId(2), TaskId(1)));
    assert_eq!(suggestions[0].reason, "Research should complete before Writing");
}
