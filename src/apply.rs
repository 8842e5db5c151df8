//! Creating dependencies on the backend, one request at a time.
//!
//! Bulk creation is not transactional. Every pair is attempted in order and
//! each outcome is recorded. Requests are never issued concurrently, since a
//! later pair may rely on an earlier one being committed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{CreatedDependency, DependencyRequest, DependencyService};
use crate::core::TaskId;
use crate::error::{Error, Result};
use crate::inference::DependencySuggestion;

/// A pair the backend did not accept, with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyFailure {
    pub predecessor: TaskId,
    pub successor: TaskId,
    pub detail: String,
}

/// Aggregate outcome of a bulk creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub succeeded: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ApplyFailure>,
}

impl ApplySummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    fn record_success(&mut self) {
        self.succeeded += 1;
    }

    fn record_failure(&mut self, pair: (TaskId, TaskId), detail: String) {
        self.failed += 1;
        self.failures.push(ApplyFailure {
            predecessor: pair.0,
            successor: pair.1,
            detail,
        });
    }
}

impl std::fmt::Display for ApplySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} created, {} failed", self.succeeded, self.failed)
    }
}

/// Submits dependency pairs to a [`DependencyService`].
pub struct BulkApplier<'a> {
    service: &'a dyn DependencyService,
}

impl<'a> BulkApplier<'a> {
    pub fn new(service: &'a dyn DependencyService) -> Self {
        Self { service }
    }

    /// Create every pair in order and count the outcomes.
    ///
    /// Transport errors and backend rejections both count as failures; a
    /// failure never stops the remaining pairs from being attempted.
    pub async fn apply(&self, pairs: &[(TaskId, TaskId)]) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for &pair in pairs {
            let request = DependencyRequest::from(pair);
            match self.service.create_dependency(&request).await {
                Ok(created) => {
                    debug!(
                        predecessor = %pair.0,
                        successor = %pair.1,
                        id = ?created.id,
                        "dependency created"
                    );
                    summary.record_success();
                }
                Err(e) => {
                    warn!(
                        predecessor = %pair.0,
                        successor = %pair.1,
                        error = %e,
                        "dependency creation failed"
                    );
                    summary.record_failure(pair, failure_detail(&e));
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk dependency creation finished"
        );
        summary
    }

    /// Create the dependencies proposed by `suggestions`, in their order.
    pub async fn apply_suggestions(&self, suggestions: &[DependencySuggestion]) -> ApplySummary {
        let pairs: Vec<(TaskId, TaskId)> = suggestions.iter().map(|s| s.pair()).collect();
        self.apply(&pairs).await
    }

    /// Create a single, hand-picked dependency.
    ///
    /// # Errors
    /// Returns `Error::SelfDependency` without contacting the backend when
    /// both ends are the same task; otherwise whatever the backend reports.
    pub async fn create_one(
        &self,
        predecessor: TaskId,
        successor: TaskId,
    ) -> Result<CreatedDependency> {
        if predecessor == successor {
            return Err(Error::SelfDependency(predecessor));
        }
        self.service
            .create_dependency(&DependencyRequest::new(predecessor, successor))
            .await
    }
}

fn failure_detail(error: &Error) -> String {
    match error {
        Error::Api { detail, .. } => detail.clone(),
        other => other.to_string(),
    }
}
