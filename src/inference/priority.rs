//! Priority chain: finish higher-priority work before lower-priority work.

use super::{Confidence, DependencySuggestion, Strategy, SuggestionSet};
use crate::core::Task;

/// Chains priority groups from highest to lowest.
///
/// Tasks are grouped by exact priority, each group keeping input order. For
/// every pair of consecutive groups, the last task of the higher group is
/// linked to the first task of the lower one.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityChainStrategy;

impl Strategy for PriorityChainStrategy {
    fn name(&self) -> &'static str {
        "priority_chain"
    }

    fn suggest(&self, tasks: &[Task], out: &mut SuggestionSet) {
        let mut groups: Vec<(u8, Vec<&Task>)> = Vec::new();
        for task in tasks {
            match groups.iter_mut().find(|(p, _)| *p == task.priority) {
                Some((_, members)) => members.push(task),
                None => groups.push((task.priority, vec![task])),
            }
        }
        groups.sort_by(|a, b| b.0.cmp(&a.0));

        for pair in groups.windows(2) {
            let (high, upper) = &pair[0];
            let (low, lower) = &pair[1];
            let (Some(from), Some(to)) = (upper.last(), lower.first()) else {
                continue;
            };
            let reason = format!(
                "Priority {} work should finish before priority {} work",
                high, low
            );
            out.push(DependencySuggestion::new(from, to, reason, Confidence::Medium));
        }
    }
}
