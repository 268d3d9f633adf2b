//! Facility Planner: capacity, expansion and economics for production facilities
//!
//! Planning engine for oil/gas processing facilities.
//!
//! ## Architecture
//!
//! - **Cost Model**: power-law CAPEX curves per facility/unit type
//! - **Capacity Analyzer**: yearly utilization, bottleneck and turndown flags
//! - **Expansion Planner**: block-sized oil/gas additions where demand outgrows capacity
//! - **Scenario Evaluator**: cashflows, NPV, IRR and break-even price per scenario
//! - **Task Runner**: off-thread execution with progress reporting

pub mod config;
pub mod engine;
pub mod error;
pub mod runner;
pub mod types;

// Re-export configuration
pub use config::PlannerConfig;

// Re-export error taxonomy
pub use error::{ErrorKind, PlanningError};

// Re-export engine
pub use engine::{rank_scenarios, PlanningEngine, RankingMetric, SortDirection};

// Re-export task runner
pub use runner::{Task, TaskRequest, TaskRunner, TaskStatus, TaskTicket};

// Re-export commonly used types
pub use types::{
    CapacityAnalysis, CapacityAnalysisEntry, ExpansionItem, FacilityDesign, ProductionPeriod,
    ProductionProfile, ProjectInfo, Scenario, ScenarioParameters, ScenarioResult,
};
