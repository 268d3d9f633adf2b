//! facility-planner - run a full facility analysis from a JSON case file
//!
//! # Usage
//!
//! ```bash
//! facility-planner --case demos/north_field.json
//! facility-planner --case case.json --config planner_config.toml --rank-by irr
//! RUST_LOG=debug facility-planner --case case.json --log-json
//! ```
//!
//! # Environment Variables
//!
//! - `PLANNER_CONFIG`: Path to planner config TOML (default: ./planner_config.toml)
//! - `RUST_LOG`: Logging level (default: info)
//!
//! The report is printed to stdout as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use facility_planner::config::{self, PlannerConfig};
use facility_planner::runner::{FullAnalysisPayload, TaskOutput, TaskRequest, TaskRunner, WorkerEvent};
use facility_planner::types::{FacilityDesign, ProductionPeriod, ProjectInfo, ScenarioSpec};
use facility_planner::{rank_scenarios, PlanningEngine, RankingMetric, SortDirection, TaskStatus};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "facility-planner")]
#[command(about = "Facility capacity, expansion and scenario economics")]
#[command(version)]
struct CliArgs {
    /// JSON case file: {project, facility, profile, scenarios}
    #[arg(long)]
    case: PathBuf,

    /// Planner config TOML (overrides PLANNER_CONFIG and ./planner_config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Metric used to order scenario results
    #[arg(long, default_value = "npv")]
    rank_by: RankingMetric,

    /// Rank lowest first instead of highest first
    #[arg(long)]
    ascending: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "PLANNER_LOG_JSON")]
    log_json: bool,
}

/// Case file layout. Scenarios are given as specs and created on load.
#[derive(Debug, Deserialize)]
struct CaseFile {
    #[serde(default)]
    project: Option<ProjectInfo>,
    #[serde(default)]
    facility: Option<FacilityDesign>,
    #[serde(default)]
    profile: Vec<ProductionPeriod>,
    #[serde(default)]
    scenarios: Vec<ScenarioSpec>,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    match path {
        Some(p) => PlannerConfig::load_from_file(p)
            .with_context(|| format!("Failed to load planner config {}", p.display())),
        None => Ok(PlannerConfig::load()),
    }
}

fn load_case(path: &Path) -> Result<CaseFile> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read case file {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid case file {}", path.display()))
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let planner_config = load_config(args.config.as_deref())?;
    let worker_threads = planner_config.runner.worker_threads;
    info!(planner = %planner_config.planner.name, "Planner configured");
    config::init(planner_config);

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }
    let runtime = builder.build().context("Failed to start tokio runtime")?;

    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let case = load_case(&args.case)?;
    let engine = Arc::new(PlanningEngine::from_global_config());

    let scenarios = case
        .scenarios
        .iter()
        .map(|spec| engine.create_scenario(&spec.name, &spec.description, &spec.parameters))
        .collect();
    let payload = FullAnalysisPayload {
        project: case.project,
        facility: case.facility,
        profile: case.profile,
        scenarios,
    };

    let runner = TaskRunner::new(Arc::clone(&engine));
    let mut ticket = runner.submit(TaskRequest::RunFullAnalysis(payload));
    info!(task_id = %ticket.id(), "Full analysis submitted");

    while let Some(message) = ticket.next_event().await {
        match &message.event {
            WorkerEvent::Progress { progress, message } => info!(progress, "{}", message),
            WorkerEvent::Success(_) => break,
            WorkerEvent::Error(failure) => {
                for detail in &failure.details {
                    warn!(code = %failure.code, "{}", detail);
                }
                break;
            }
        }
    }

    let task = ticket.wait().await?;
    let report = match (task.status, task.result) {
        (TaskStatus::Completed, Some(TaskOutput::FullAnalysis(report))) => report,
        _ => {
            let failure = task.error.map_or_else(|| "unknown failure".to_string(), |e| format!("{}: {}", e.code, e.message));
            bail!("Analysis failed: {failure}");
        }
    };

    let mut report = *report;
    let direction = if args.ascending { SortDirection::Ascending } else { SortDirection::Descending };
    report.scenario_results = rank_scenarios(&report.scenario_results, args.rank_by, direction);

    let [cost, capacity] = engine.cache_stats();
    info!(
        cost_hits = cost.hits,
        cost_misses = cost.misses,
        capacity_hits = capacity.hits,
        capacity_misses = capacity.misses,
        "Cache usage"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
