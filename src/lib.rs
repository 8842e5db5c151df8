//! Task dependency graph tooling for the project dashboard.
//!
//! - [`core`]: task snapshots and the [`GraphModel`] built from them
//! - [`layout`]: layered coordinates for drawing the graph
//! - [`inference`]: heuristic dependency suggestions
//! - [`apply`]: creating chosen dependencies on the backend
//! - [`client`]: the backend seam and its HTTP implementation

pub mod apply;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod inference;
pub mod layout;
pub mod log;

pub use apply::{ApplyFailure, ApplySummary, BulkApplier};
pub use client::{DependencyRequest, DependencyService, HttpDependencyService};
pub use crate::core::{DagSnapshot, DependencyEdge, GraphModel, Task, TaskId, TaskStatus};
pub use error::{Error, Result};
pub use inference::{infer_dependencies, Confidence, DependencySuggestion, InferenceEngine};
pub use layout::{compute_layout, BoundingBox, LayeredNode, Layout, LayoutConfig, LayoutEngine};
