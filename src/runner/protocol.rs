//! Task runner message protocol and host-side task records.
//!
//! Requests travel as `{type, payload, id}`; the worker answers with any
//! number of `PROGRESS` messages followed by exactly one `SUCCESS` or
//! `ERROR`. Message order within a task is preserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ErrorKind, PlanningError};
use crate::types::{
    CapacityAnalysisEntry, CapexEstimate, CapexRequest, ExpansionItem, FacilityDesign,
    ProductionPeriod, ProjectInfo, Scenario,
};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RunFullAnalysis,
    GenerateExpansionPlan,
    CalculateCapexBatch,
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RunFullAnalysis => write!(f, "RUN_FULL_ANALYSIS"),
            Self::GenerateExpansionPlan => write!(f, "GENERATE_EXPANSION_PLAN"),
            Self::CalculateCapexBatch => write!(f, "CALCULATE_CAPEX_BATCH"),
        }
    }
}

/// Inputs of a full analysis: validate, analyze capacity, plan, aggregate cost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FullAnalysisPayload {
    #[serde(default)]
    pub project: Option<ProjectInfo>,
    #[serde(default)]
    pub facility: Option<FacilityDesign>,
    #[serde(default)]
    pub profile: Vec<ProductionPeriod>,
    /// Scenarios evaluated against the shared plan during cost aggregation
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExpansionPlanPayload {
    #[serde(default)]
    pub facility: Option<FacilityDesign>,
    #[serde(default)]
    pub profile: Vec<ProductionPeriod>,
}

/// Work the runner can execute off the caller's thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskRequest {
    RunFullAnalysis(FullAnalysisPayload),
    GenerateExpansionPlan(ExpansionPlanPayload),
    CalculateCapexBatch(Vec<CapexRequest>),
}

impl TaskRequest {
    pub const fn task_type(&self) -> TaskType {
        match self {
            Self::RunFullAnalysis(_) => TaskType::RunFullAnalysis,
            Self::GenerateExpansionPlan(_) => TaskType::GenerateExpansionPlan,
            Self::CalculateCapexBatch(_) => TaskType::CalculateCapexBatch,
        }
    }
}

/// Request as dispatched to the worker: `{type, payload, id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerRequest {
    pub id: String,
    #[serde(flatten)]
    pub request: TaskRequest,
}

// ============================================================================
// Responses
// ============================================================================

/// Bottlenecked years per commodity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BottleneckYears {
    pub oil: Vec<i32>,
    pub gas: Vec<i32>,
    pub water: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FullAnalysisReport {
    pub project: Option<ProjectInfo>,
    /// Non-blocking validation findings
    pub validation_warnings: Vec<String>,
    pub capacity_analysis: Vec<CapacityAnalysisEntry>,
    pub expansion_plan: Vec<ExpansionItem>,
    /// Dollars, before any scenario multiplier
    pub total_expansion_capex: f64,
    pub bottleneck_years: BottleneckYears,
    /// Completed scenarios ranked by NPV, highest first
    pub scenario_results: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutput {
    FullAnalysis(Box<FullAnalysisReport>),
    ExpansionPlan(Vec<ExpansionItem>),
    CapexBatch(Vec<CapexEstimate>),
}

/// Failure carried by an `ERROR` message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskFailure {
    pub message: String,
    pub code: ErrorKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl From<&PlanningError> for TaskFailure {
    fn from(e: &PlanningError) -> Self {
        Self {
            message: e.to_string(),
            code: e.kind(),
            details: e.details(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerEvent {
    Progress { progress: u8, message: String },
    Success(TaskOutput),
    Error(TaskFailure),
}

impl WorkerEvent {
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Response from the worker: `{type, id, payload}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerMessage {
    pub id: String,
    #[serde(flatten)]
    pub event: WorkerEvent,
}

// ============================================================================
// Host-side task record
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl TaskStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Host-side record of a submitted task, updated only from worker messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub progress: u8,
    pub message: String,
    pub result: Option<TaskOutput>,
    pub error: Option<TaskFailure>,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn pending(id: String, task_type: TaskType) -> Self {
        Self {
            id,
            task_type,
            status: TaskStatus::Pending,
            progress: 0,
            message: String::new(),
            result: None,
            error: None,
            submitted_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Apply a worker event. Events after a terminal state are ignored.
    pub fn apply(&mut self, event: &WorkerEvent) {
        if self.status.is_terminal() {
            warn!(task_id = %self.id, status = %self.status, "Ignoring message for finished task");
            return;
        }
        match event {
            WorkerEvent::Progress { progress, message } => {
                self.status = TaskStatus::Processing;
                self.progress = *progress;
                self.message.clone_from(message);
            }
            WorkerEvent::Success(output) => {
                self.status = TaskStatus::Completed;
                self.progress = 100;
                self.result = Some(output.clone());
                self.completed_at = Some(Utc::now());
            }
            WorkerEvent::Error(failure) => {
                self.status = TaskStatus::Error;
                self.message.clone_from(&failure.message);
                self.error = Some(failure.clone());
                self.completed_at = Some(Utc::now());
            }
        }
    }
}
