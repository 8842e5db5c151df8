//! Heuristic dependency inference.
//!
//! The engine looks at a task list with no edges and proposes plausible
//! "must finish before" pairs. Each [`Strategy`] works on its own; their
//! results are merged into one [`SuggestionSet`], where the first suggestion
//! for a given (predecessor, successor) pair wins and later ones are dropped.
//!
//! Inference is pure: the same task list always yields the same suggestions
//! in the same order.

pub mod phase;
pub mod priority;
pub mod rules;
pub mod skill;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Task, TaskId};
use crate::error::{Error, Result};

pub use phase::PhaseStrategy;
pub use priority::PriorityChainStrategy;
pub use rules::{PhaseRule, PhaseRules, RuleSet, SkillFlow, SkillFlowRule};
pub use skill::SkillFlowStrategy;

/// Minimum number of tasks inference needs to say anything.
pub const MIN_TASKS: usize = 2;

/// How strongly a strategy believes in a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            other => Err(Error::Validation(format!("unknown confidence: {}", other))),
        }
    }
}

/// A proposed dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySuggestion {
    pub predecessor: Task,
    pub successor: Task,
    pub reason: String,
    pub confidence: Confidence,
}

impl DependencySuggestion {
    pub fn new(predecessor: &Task, successor: &Task, reason: String, confidence: Confidence) -> Self {
        Self {
            predecessor: predecessor.clone(),
            successor: successor.clone(),
            reason,
            confidence,
        }
    }

    /// `(predecessor id, successor id)`.
    pub fn pair(&self) -> (TaskId, TaskId) {
        (self.predecessor.id, self.successor.id)
    }
}

/// Suggestions in insertion order, unique by pair, never self-referencing.
#[derive(Debug, Clone, Default)]
pub struct SuggestionSet {
    items: Vec<DependencySuggestion>,
    seen: HashSet<(TaskId, TaskId)>,
}

impl SuggestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, predecessor: TaskId, successor: TaskId) -> bool {
        self.seen.contains(&(predecessor, successor))
    }

    /// Add a suggestion unless it is a self-pair or its pair is already present.
    ///
    /// Returns `true` if the suggestion was kept.
    pub fn push(&mut self, suggestion: DependencySuggestion) -> bool {
        let pair = suggestion.pair();
        if pair.0 == pair.1 || !self.seen.insert(pair) {
            return false;
        }
        self.items.push(suggestion);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[DependencySuggestion] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<DependencySuggestion> {
        self.items
    }
}

/// One independent way of guessing dependencies.
pub trait Strategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Append this strategy's suggestions to `out`, in a deterministic order.
    fn suggest(&self, tasks: &[Task], out: &mut SuggestionSet);
}

/// Runs a fixed list of strategies over a task list.
pub struct InferenceEngine {
    strategies: Vec<Box<dyn Strategy>>,
}

impl InferenceEngine {
    /// Engine with the built-in phase, priority-chain and skill-flow strategies.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            strategies: vec![
                Box::new(PhaseStrategy::new(rules.phases)),
                Box::new(PriorityChainStrategy),
                Box::new(SkillFlowStrategy::new(rules.skill_flow)),
            ],
        }
    }

    /// Engine with no strategies; add some with [`InferenceEngine::with_strategy`].
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy; it runs after the ones already registered.
    pub fn with_strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Refuse inference on fewer than two tasks.
    ///
    /// # Errors
    /// Returns `Error::NotEnoughTasks` with the number of tasks found.
    pub fn ensure_enough_tasks(tasks: &[Task]) -> Result<()> {
        if tasks.len() < MIN_TASKS {
            return Err(Error::NotEnoughTasks { found: tasks.len() });
        }
        Ok(())
    }

    /// Suggest dependencies for `tasks`. Fewer than two tasks yield nothing.
    pub fn infer(&self, tasks: &[Task]) -> Vec<DependencySuggestion> {
        if tasks.len() < MIN_TASKS {
            debug!(tasks = tasks.len(), "too few tasks, skipping inference");
            return Vec::new();
        }

        let mut set = SuggestionSet::new();
        for strategy in &self.strategies {
            let before = set.len();
            strategy.suggest(tasks, &mut set);
            debug!(
                strategy = strategy.name(),
                added = set.len() - before,
                "inference strategy finished"
            );
        }
        set.into_vec()
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

/// Infer dependencies with the default rule tables.
pub fn infer_dependencies(tasks: &[Task]) -> Vec<DependencySuggestion> {
    InferenceEngine::default().infer(tasks)
}
