//! Skill flow: a task producing what another task's skills consume goes first.

use super::rules::SkillFlow;
use super::{Confidence, DependencySuggestion, Strategy, SuggestionSet};
use crate::core::Task;

/// Checks every ordered pair of distinct tasks against the skill-flow table.
#[derive(Debug, Clone, Default)]
pub struct SkillFlowStrategy {
    flow: SkillFlow,
}

impl SkillFlowStrategy {
    pub fn new(flow: SkillFlow) -> Self {
        Self { flow }
    }
}

impl Strategy for SkillFlowStrategy {
    fn name(&self) -> &'static str {
        "skill_flow"
    }

    fn suggest(&self, tasks: &[Task], out: &mut SuggestionSet) {
        let skills: Vec<Vec<String>> = tasks.iter().map(Task::skills_lowercase).collect();

        for (i, producer) in tasks.iter().enumerate() {
            if skills[i].is_empty() {
                continue;
            }
            for (j, consumer) in tasks.iter().enumerate() {
                if i == j || producer.id == consumer.id {
                    continue;
                }
                if out.contains(producer.id, consumer.id) {
                    continue;
                }
                if self.flow.feeds(&skills[i], &skills[j]) {
                    let reason = format!(
                        "{} produces outputs needed by {}",
                        producer.name, consumer.name
                    );
                    out.push(DependencySuggestion::new(
                        producer,
                        consumer,
                        reason,
                        Confidence::Medium,
                    ));
                }
            }
        }
    }
}
