//! Task data model for the dependency graph.
//!
//! Tasks are owned by a project on the backend; this crate only ever sees
//! snapshots of them. Fields the DAG endpoint does not send fall back to the
//! backend's own defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default estimated duration in minutes when the snapshot omits it.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Default priority assigned by the backend to new tasks.
pub const DEFAULT_PRIORITY: u8 = 3;

/// Identifier of a task, assigned by the backend and stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Task status in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task created but not started.
    #[default]
    Pending,
    /// Task is being worked on.
    InProgress,
    /// Task finished.
    Completed,
    /// Task cannot proceed.
    Blocked,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Blocked => write!(f, "blocked"),
        }
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

/// A single task in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Backend-assigned identifier.
    pub id: TaskId,
    /// Human-readable name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Estimated duration in minutes.
    #[serde(default = "default_duration")]
    pub estimated_duration: u32,
    /// Priority from 1 to 5, 5 being the highest.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Skill labels required to work on the task.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,
    /// When the backend created the task, if it was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending task with backend defaults for everything but id and name.
    pub fn new(id: impl Into<TaskId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            description: None,
            estimated_duration: DEFAULT_DURATION_MINUTES,
            priority: DEFAULT_PRIORITY,
            required_skills: Vec::new(),
            status: TaskStatus::Pending,
            created_at: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = minutes;
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Lower-cased `name` and `description` joined by a space.
    ///
    /// This is the text the keyword heuristics scan.
    pub fn search_text(&self) -> String {
        let mut text = self.name.to_lowercase();
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(&description.to_lowercase());
        }
        text
    }

    /// Required skills, lower-cased.
    pub fn skills_lowercase(&self) -> Vec<String> {
        self.required_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect()
    }

    /// Case-insensitive check for a required skill.
    pub fn requires_skill(&self, skill: &str) -> bool {
        let skill = skill.trim();
        self.required_skills
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(skill))
    }

    pub fn is_finished(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// A "must finish before" relation between two tasks.
///
/// On the wire the backend names the ends `from` and `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    #[serde(rename = "from")]
    pub predecessor: TaskId,
    #[serde(rename = "to")]
    pub successor: TaskId,
}

impl DependencyEdge {
    pub fn new(predecessor: impl Into<TaskId>, successor: impl Into<TaskId>) -> Self {
        Self {
            predecessor: predecessor.into(),
            successor: successor.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.predecessor == self.successor
    }

    pub fn pair(&self) -> (TaskId, TaskId) {
        (self.predecessor, self.successor)
    }
}

impl From<(TaskId, TaskId)> for DependencyEdge {
    fn from((predecessor, successor): (TaskId, TaskId)) -> Self {
        Self {
            predecessor,
            successor,
        }
    }
}

impl std::fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.predecessor, self.successor)
    }
}
