//! Phase ordering: planning before design before development, and so on.

use super::rules::PhaseRules;
use super::{Confidence, DependencySuggestion, Strategy, SuggestionSet};
use crate::core::Task;

/// Orders tasks by inferred lifecycle phase and links each phase step.
///
/// Tasks are stably sorted by phase; every adjacent pair whose phase strictly
/// increases becomes a high-confidence suggestion.
#[derive(Debug, Clone, Default)]
pub struct PhaseStrategy {
    rules: PhaseRules,
}

impl PhaseStrategy {
    pub fn new(rules: PhaseRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PhaseRules {
        &self.rules
    }
}

impl Strategy for PhaseStrategy {
    fn name(&self) -> &'static str {
        "phase"
    }

    fn suggest(&self, tasks: &[Task], out: &mut SuggestionSet) {
        let mut phased: Vec<(u8, &Task)> = tasks
            .iter()
            .map(|task| (self.rules.classify(task), task))
            .collect();
        // sort_by_key is stable, ties keep input order
        phased.sort_by_key(|(phase, _)| *phase);

        for window in phased.windows(2) {
            let (from_phase, from) = window[0];
            let (to_phase, to) = window[1];
            if to_phase > from_phase {
                let reason = format!(
                    "{} should complete before {}",
                    self.rules.name_of(from_phase),
                    self.rules.name_of(to_phase)
                );
                out.push(DependencySuggestion::new(from, to, reason, Confidence::High));
            }
        }
    }
}
