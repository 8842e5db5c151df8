//! Rule tables for dependency inference.
//!
//! Both tables are plain data so they can be replaced from the config file
//! without touching the strategies that read them.

use serde::{Deserialize, Serialize};

use crate::core::Task;

/// One lifecycle phase and the words that place a task in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRule {
    pub phase: u8,
    pub name: String,
    pub keywords: Vec<String>,
}

impl PhaseRule {
    pub fn new(phase: u8, name: &str, keywords: &[&str]) -> Self {
        Self {
            phase,
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
    }
}

/// Ordered keyword table; the first rule that matches wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseRules(pub Vec<PhaseRule>);

impl Default for PhaseRules {
    fn default() -> Self {
        Self(vec![
            PhaseRule::new(1, "Planning", &["requirement", "analysis", "planning"]),
            PhaseRule::new(2, "Design", &["design", "mockup", "wireframe", "prototype"]),
            PhaseRule::new(
                3,
                "Development",
                &["frontend", "backend", "development", "implementation", "coding"],
            ),
            PhaseRule::new(4, "Testing", &["testing", "qa", "quality", "test"]),
            PhaseRule::new(5, "Deployment", &["deployment", "release", "launch", "production"]),
        ])
    }
}

impl PhaseRules {
    /// Phase of a task from its name and description.
    ///
    /// Tasks that match no keyword use their priority as the phase.
    pub fn classify(&self, task: &Task) -> u8 {
        let text = task.search_text();
        self.0
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.phase)
            .unwrap_or(task.priority)
    }

    pub fn name_of(&self, phase: u8) -> String {
        self.0
            .iter()
            .find(|rule| rule.phase == phase)
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| format!("Phase {}", phase))
    }
}

/// A skill whose output is consumed by tasks needing any of `consumers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFlowRule {
    pub producer: String,
    pub consumers: Vec<String>,
}

impl SkillFlowRule {
    pub fn new(producer: &str, consumers: &[&str]) -> Self {
        Self {
            producer: producer.to_string(),
            consumers: consumers.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Producer to consumer skill table. Lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillFlow(pub Vec<SkillFlowRule>);

impl Default for SkillFlow {
    fn default() -> Self {
        Self(vec![
            SkillFlowRule::new("requirements", &["design", "ui/ux"]),
            SkillFlowRule::new("design", &["frontend", "react", "vue", "css"]),
            SkillFlowRule::new("frontend", &["testing", "qa"]),
            SkillFlowRule::new("backend", &["testing", "qa"]),
            SkillFlowRule::new("api", &["frontend", "integration"]),
        ])
    }
}

impl SkillFlow {
    /// Skills fed by `producer`, across every rule naming it.
    pub fn consumers_of<'a>(&'a self, producer: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |rule| rule.producer.trim().eq_ignore_ascii_case(producer.trim()))
            .flat_map(|rule| rule.consumers.iter().map(String::as_str))
    }

    /// Whether any skill in `produced` feeds any skill in `needed`.
    pub fn feeds(&self, produced: &[String], needed: &[String]) -> bool {
        produced.iter().any(|skill| {
            self.consumers_of(skill)
                .any(|c| needed.iter().any(|n| n.trim().eq_ignore_ascii_case(c.trim())))
        })
    }
}

/// Every table the inference strategies consult.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub phases: PhaseRules,
    pub skill_flow: SkillFlow,
}
