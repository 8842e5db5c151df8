//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Predefined task sets and snapshots
//! - An in-memory backend that enforces the same rules as the real one

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use taskdag::client::{CreatedDependency, DependencyRequest, DependencyService};
use taskdag::core::{DagSnapshot, DependencyEdge, GraphModel, Task, TaskId};
use taskdag::{Error, Result};

/// Create a task with the given id, name and priority.
pub fn test_task(id: i64, name: &str, priority: u8) -> Task {
    Task::new(id, name).with_priority(priority)
}

pub fn edges(pairs: &[(i64, i64)]) -> Vec<DependencyEdge> {
    pairs.iter().map(|&(a, b)| DependencyEdge::new(a, b)).collect()
}

pub fn pairs(raw: &[(i64, i64)]) -> Vec<(TaskId, TaskId)> {
    raw.iter().map(|&(a, b)| (TaskId(a), TaskId(b))).collect()
}

/// The website redesign project used throughout the backend's own tests.
pub fn website_tasks() -> Vec<Task> {
    vec![
        Task::new(1, "Requirements Gathering")
            .with_description("Gather all website requirements")
            .with_duration(240)
            .with_priority(5)
            .with_skills(["requirements"]),
        Task::new(2, "UI/UX Design")
            .with_description("Create wireframes and mockups")
            .with_duration(480)
            .with_priority(4)
            .with_skills(["design", "ui/ux"]),
        Task::new(3, "Frontend Development")
            .with_description("Build the React frontend")
            .with_duration(960)
            .with_priority(4)
            .with_skills(["frontend", "react"]),
        Task::new(4, "Backend API")
            .with_description("Implement REST endpoints")
            .with_duration(720)
            .with_priority(4)
            .with_skills(["backend", "api"]),
        Task::new(5, "Testing & QA")
            .with_description("End-to-end testing")
            .with_duration(360)
            .with_priority(3)
            .with_skills(["qa", "testing"]),
        Task::new(6, "Deployment")
            .with_description("Release to production")
            .with_duration(120)
            .with_priority(2),
    ]
}

/// Diamond: 1 -> {2, 3} -> 4.
pub fn diamond_snapshot() -> DagSnapshot {
    DagSnapshot::new(
        vec![
            test_task(1, "Plan", 5),
            test_task(2, "Left", 3),
            test_task(3, "Right", 3),
            test_task(4, "Join", 1),
        ],
        edges(&[(1, 2), (1, 3), (2, 4), (3, 4)]),
    )
}

/// In-memory backend.
///
/// Rejects duplicates, self-loops, unknown tasks and edges that would close
/// a cycle, like the real backend. Pairs listed in `fail_transport` fail as
/// if the connection dropped.
pub struct MemoryBackend {
    tasks: Vec<Task>,
    edges: Mutex<Vec<DependencyEdge>>,
    fail_transport: HashSet<(TaskId, TaskId)>,
    calls: Mutex<Vec<(TaskId, TaskId)>>,
}

impl MemoryBackend {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            edges: Mutex::new(Vec::new()),
            fail_transport: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_edges(self, existing: Vec<DependencyEdge>) -> Self {
        *self.edges.lock().unwrap() = existing;
        self
    }

    pub fn failing_transport_on(mut self, raw: &[(i64, i64)]) -> Self {
        self.fail_transport.extend(pairs(raw));
        self
    }

    pub fn calls(&self) -> Vec<(TaskId, TaskId)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored_edges(&self) -> Vec<DependencyEdge> {
        self.edges.lock().unwrap().clone()
    }

    fn reject(detail: &str) -> Error {
        Error::Api {
            status: 400,
            detail: detail.to_string(),
        }
    }
}

#[async_trait]
impl DependencyService for MemoryBackend {
    async fn fetch_dag(&self, _project_id: i64) -> Result<DagSnapshot> {
        Ok(DagSnapshot::new(self.tasks.clone(), self.stored_edges()))
    }

    async fn create_dependency(&self, request: &DependencyRequest) -> Result<CreatedDependency> {
        let pair = request.pair();
        self.calls.lock().unwrap().push(pair);

        if self.fail_transport.contains(&pair) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }

        let mut stored = self.edges.lock().unwrap();
        let edge = DependencyEdge::from(pair);
        if stored.contains(&edge) {
            return Err(Self::reject("Dependency already exists"));
        }

        let model = GraphModel::from_parts(self.tasks.clone(), stored.clone());
        if !model.contains_task(&pair.0) || !model.contains_task(&pair.1) {
            return Err(Error::Api {
                status: 404,
                detail: "One or both tasks not found".to_string(),
            });
        }
        if model.would_create_cycle(&pair.0, &pair.1)? {
            return Err(Self::reject("This dependency creates a cycle"));
        }

        stored.push(edge);
        Ok(CreatedDependency {
            message: "Dependency created successfully".to_string(),
            id: Some(stored.len() as i64),
        })
    }
}
