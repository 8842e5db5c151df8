//! Core domain models for the task dependency graph.
//!
//! This module contains the task snapshot types and the graph model that
//! layout and scheduling work from.

pub mod dag;
pub mod task;

pub use dag::{DagSnapshot, GraphModel};
pub use task::{DependencyEdge, Task, TaskId, TaskStatus};
