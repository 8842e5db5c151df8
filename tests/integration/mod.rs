//! Integration test suite for taskdag.
//!
//! These tests drive the public API end to end: snapshot to layout,
//! task list to suggestions, and suggestions to backend requests.
//!
//! # Test Categories
//!
//! - `layout_e2e`: layering of realistic and malformed snapshots
//! - `inference_e2e`: suggestion lists for project-shaped task sets
//! - `apply_e2e`: bulk and manual creation against a scripted backend
//! - `properties`: randomized invariants (termination, ordering, dedup)
//!
//! # CI Compatibility
//!
//! The backend is replaced by an in-memory service, so no network access
//! is needed.

mod fixtures;

mod apply_e2e;
mod inference_e2e;
mod layout_e2e;
