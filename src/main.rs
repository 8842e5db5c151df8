use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{debug, info};

use taskdag::client::{DependencyRequest, DependencyService, HttpDependencyService};
use taskdag::config::Config;
use taskdag::core::{DagSnapshot, GraphModel, Task, TaskId};
use taskdag::inference::{Confidence, DependencySuggestion, InferenceEngine};
use taskdag::layout::{Layout, LayoutEngine};
use taskdag::{ApplySummary, BulkApplier, Error, Result};

/// taskdag - lay out, infer and create task dependencies
#[derive(Parser, Debug)]
#[command(name = "taskdag")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    TASKDAG_DEBUG=1    Enable debug logging (alternative to --debug)\n    TASKDAG_LOG=LEVEL  Log level (error, warn, info, debug, trace)\n    TASKDAG_TOKEN=...  Bearer token for the backend")]
pub struct Cli {
    /// Enable debug logging (to stderr)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Config file (defaults to ~/.taskdag/taskdag.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the task snapshot comes from.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct Source {
    /// Read a JSON snapshot ({nodes, edges}) or task array from a file
    #[arg(long, short = 'i', conflicts_with = "project")]
    pub input: Option<PathBuf>,

    /// Fetch the snapshot of this project from the backend
    #[arg(long, short = 'p')]
    pub project: Option<i64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Compute levels and coordinates for every task
    Layout {
        #[command(flatten)]
        source: Source,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Suggest dependencies from task names, priorities and skills
    Infer {
        #[command(flatten)]
        source: Source,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create many dependencies, one request at a time
    Apply {
        /// JSON list of pairs: [[1, 2], ...] or [{"predecessor_task_id": 1, "successor_task_id": 2}, ...]
        #[arg(long, short = 'i', conflicts_with = "infer")]
        input: Option<PathBuf>,

        /// Infer suggestions for the project and create them
        #[arg(long, requires = "project")]
        infer: bool,

        /// Project to infer from
        #[arg(long, short = 'p')]
        project: Option<i64>,

        /// Only create inferred suggestions at or above this confidence (high, medium)
        #[arg(long, default_value = "medium")]
        min_confidence: Confidence,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create one dependency: PREDECESSOR must finish before SUCCESSOR
    Link {
        predecessor: TaskId,
        successor: TaskId,
    },

    /// Print tasks in dependency order, highest priority first among ready tasks
    Order {
        #[command(flatten)]
        source: Source,
    },
}

/// A task list on disk: either a bare array or a DAG snapshot.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskFile {
    Tasks(Vec<Task>),
    Snapshot(DagSnapshot),
}

impl From<TaskFile> for DagSnapshot {
    fn from(file: TaskFile) -> Self {
        match file {
            TaskFile::Tasks(nodes) => DagSnapshot::new(nodes, Vec::new()),
            TaskFile::Snapshot(snapshot) => snapshot,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PairEntry {
    Tuple(TaskId, TaskId),
    Request(DependencyRequest),
}

impl PairEntry {
    fn pair(&self) -> (TaskId, TaskId) {
        match self {
            PairEntry::Tuple(p, s) => (*p, *s),
            PairEntry::Request(request) => request.pair(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    taskdag::log::init_with_debug(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if cli.token.is_some() {
        config.token = cli.token;
    }
    debug!(command = ?cli.command, api_url = %config.api_url, "taskdag starting");

    let service = HttpDependencyService::new(&config.api_url, config.token.clone());

    match cli.command {
        Command::Layout { source, json } => run_layout(&config, &service, &source, json),
        Command::Infer { source, json } => run_infer(&config, &service, &source, json),
        Command::Apply {
            input,
            infer,
            project,
            min_confidence,
            json,
        } => run_apply(&config, &service, input.as_deref(), infer, project, min_confidence, json),
        Command::Link {
            predecessor,
            successor,
        } => run_link(&service, predecessor, successor),
        Command::Order { source } => run_order(&config, &service, &source),
    }
}

/// Load the snapshot from a file, or fetch it from the backend.
fn load_snapshot(config: &Config, service: &dyn DependencyService, source: &Source) -> Result<DagSnapshot> {
    if let Some(path) = &source.input {
        let file: TaskFile = serde_json::from_str(&fs::read_to_string(path)?)?;
        return Ok(file.into());
    }
    let project_id = config.resolve_project(source.project)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(service.fetch_dag(project_id))
}

fn run_layout(config: &Config, service: &dyn DependencyService, source: &Source, json: bool) -> Result<()> {
    let model = GraphModel::from_snapshot(load_snapshot(config, service, source)?);
    let layout = LayoutEngine::new(config.layout).compute(&model);

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }
    print_layout(&layout, &model);
    Ok(())
}

fn print_layout(layout: &Layout, model: &GraphModel) {
    if layout.is_empty() {
        println!("No tasks yet. Add tasks to see the dependency graph.");
        return;
    }

    for (level, nodes) in layout.levels().iter().enumerate() {
        let unresolved = nodes.iter().any(|n| n.unresolved);
        if unresolved {
            println!("Level {} (unresolved, dependency cycle)", level);
        } else {
            println!("Level {}", level);
        }
        for node in nodes {
            println!(
                "  [{}] {} ({}) at ({}, {})",
                node.task.id, node.task.name, node.task.status, node.x, node.y
            );
        }
    }
    println!();
    println!(
        "Canvas: {} x {}  ({} tasks, {} edges)",
        layout.bounds.width,
        layout.bounds.height,
        model.task_count(),
        model.dependency_count()
    );
    if !model.dangling_edges().is_empty() {
        println!(
            "Skipped {} edge(s) pointing at unknown tasks",
            model.dangling_edges().len()
        );
    }
}

fn run_infer(config: &Config, service: &dyn DependencyService, source: &Source, json: bool) -> Result<()> {
    let snapshot = load_snapshot(config, service, source)?;
    if let Err(e @ Error::NotEnoughTasks { .. }) = InferenceEngine::ensure_enough_tasks(&snapshot.nodes) {
        println!("{}", e);
        return Ok(());
    }

    let suggestions = InferenceEngine::new(config.rules.clone()).infer(&snapshot.nodes);
    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No dependencies could be inferred.");
        return Ok(());
    }
    println!("{} suggested dependencies:", suggestions.len());
    for s in &suggestions {
        print_suggestion(s);
    }
    Ok(())
}

fn print_suggestion(s: &DependencySuggestion) {
    println!(
        "  [{:<6}] {} {} -> {} {}: {}",
        s.confidence.to_string(),
        s.predecessor.id,
        s.predecessor.name,
        s.successor.id,
        s.successor.name,
        s.reason
    );
}

fn run_apply(
    config: &Config,
    service: &dyn DependencyService,
    input: Option<&Path>,
    infer: bool,
    project: Option<i64>,
    min_confidence: Confidence,
    json: bool,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let applier = BulkApplier::new(service);

    let summary = if let Some(path) = input {
        let entries: Vec<PairEntry> = serde_json::from_str(&fs::read_to_string(path)?)?;
        let pairs: Vec<(TaskId, TaskId)> = entries.iter().map(PairEntry::pair).collect();
        info!(pairs = pairs.len(), "applying pairs from file");
        rt.block_on(applier.apply(&pairs))
    } else if infer {
        let project_id = config.resolve_project(project)?;
        let snapshot = rt.block_on(service.fetch_dag(project_id))?;
        InferenceEngine::ensure_enough_tasks(&snapshot.nodes)?;
        let suggestions: Vec<DependencySuggestion> = InferenceEngine::new(config.rules.clone())
            .infer(&snapshot.nodes)
            .into_iter()
            .filter(|s| s.confidence >= min_confidence)
            .collect();
        info!(suggestions = suggestions.len(), "applying inferred suggestions");
        rt.block_on(applier.apply_suggestions(&suggestions))
    } else {
        return Err(Error::Validation(
            "apply needs --input FILE or --infer --project ID".to_string(),
        ));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &ApplySummary) {
    println!("Dependencies: {}", summary);
    for failure in &summary.failures {
        println!(
            "  {} -> {}: {}",
            failure.predecessor, failure.successor, failure.detail
        );
    }
}

fn run_link(service: &dyn DependencyService, predecessor: TaskId, successor: TaskId) -> Result<()> {
    let applier = BulkApplier::new(service);
    let rt = tokio::runtime::Runtime::new()?;
    let created = rt.block_on(applier.create_one(predecessor, successor))?;
    match created.id {
        Some(id) => println!("Dependency {} -> {} created (id {})", predecessor, successor, id),
        None => println!("Dependency {} -> {} created", predecessor, successor),
    }
    Ok(())
}

fn run_order(config: &Config, service: &dyn DependencyService, source: &Source) -> Result<()> {
    let model = GraphModel::from_snapshot(load_snapshot(config, service, source)?);
    if let Some(at) = model.find_cycle() {
        println!("Warning: dependency cycle through task {}", at);
    }
    for (position, task) in model.execution_order().iter().enumerate() {
        println!(
            "{:>3}. [{}] {} (priority {}, {} min)",
            position + 1,
            task.id,
            task.name,
            task.priority,
            task.estimated_duration
        );
    }
    Ok(())
}
