//! Planning Engine Module
//!
//! Deterministic facility planning calculations. Everything here runs on the
//! caller's thread with no I/O; the task runner is the only concurrency
//! boundary.
//!
//! ## Data flow
//! - `estimate_capex()` - power-law cost curve per facility/unit type
//! - `analyze_capacity()` - utilization and bottleneck/turndown flags per year
//! - `generate_expansion_plan()` - block-sized additions from the analysis
//! - `run_scenario_master_plan()` - cashflow, NPV, IRR and break-even per scenario
//! - `rank_scenarios()` - order completed scenarios by a metric
//!
//! The cost and capacity caches are owned by the [`PlanningEngine`]
//! instance and shared by every task that holds it.

pub mod cache;
pub mod capacity;
pub mod cost_model;
pub mod economics;
pub mod expansion;
pub mod ranking;
pub mod validation;

pub use cache::{CacheStats, MemoCache};
pub use capacity::CapacityAnalyzer;
pub use cost_model::CostModel;
pub use economics::{approximate_irr, net_present_value, round_to, ScenarioEvaluator};
pub use expansion::{round_up_to_block, ExpansionPlanner};
pub use ranking::{rank_scenarios, RankingMetric, SortDirection};
pub use validation::{validate_analysis_inputs, validate_profile_rates, ValidationReport};

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::PlannerConfig;
use crate::error::PlanningError;
use crate::types::{
    CapacityAnalysis, ExpansionItem, FacilityDesign, ParameterOverrides, ProductionPeriod, Scenario,
    ScenarioStatus,
};

/// Facade over the cost model, capacity analyzer, expansion planner and
/// scenario evaluator.
pub struct PlanningEngine {
    config: Arc<PlannerConfig>,
    cost_model: CostModel,
    capacity: CapacityAnalyzer,
}

impl Default for PlanningEngine {
    fn default() -> Self {
        Self::new(Arc::new(PlannerConfig::default()))
    }
}

impl PlanningEngine {
    pub fn new(config: Arc<PlannerConfig>) -> Self {
        let cost_model = CostModel::new(&config.cost_model);
        let capacity = CapacityAnalyzer::new(config.capacity);
        Self {
            config,
            cost_model,
            capacity,
        }
    }

    /// Engine over the process-wide configuration (see [`crate::config::init`]).
    pub fn from_global_config() -> Self {
        Self::new(Arc::new(crate::config::get().clone()))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Capital cost in dollars. See [`CostModel::estimate_capex`].
    pub fn estimate_capex(&self, facility_type: &str, capacity: f64) -> Result<f64, PlanningError> {
        self.cost_model.estimate_capex(facility_type, capacity)
    }

    /// Per-period utilization analysis. Missing inputs give an invalid analysis.
    pub fn analyze_capacity(&self, profile: &[ProductionPeriod], facility: Option<&FacilityDesign>) -> CapacityAnalysis {
        self.capacity.analyze(profile, facility)
    }

    /// Expansion additions for `profile`, walked in profile order.
    pub fn generate_expansion_plan(
        &self,
        profile: &[ProductionPeriod],
        facility: &FacilityDesign,
    ) -> Result<Vec<ExpansionItem>, PlanningError> {
        let analysis = self.analyze_capacity(profile, Some(facility));
        self.plan_from_analysis(profile, facility, &analysis)
    }

    /// Expansion additions from an analysis already computed for `profile` and `facility`.
    pub fn plan_from_analysis(
        &self,
        profile: &[ProductionPeriod],
        facility: &FacilityDesign,
        analysis: &CapacityAnalysis,
    ) -> Result<Vec<ExpansionItem>, PlanningError> {
        ExpansionPlanner::new(&self.config.expansion, &self.cost_model).plan(profile, facility, analysis)
    }

    /// New Draft scenario with `overrides` merged over the configured defaults.
    pub fn create_scenario(&self, name: &str, description: &str, overrides: &ParameterOverrides) -> Scenario {
        ScenarioEvaluator::new(&self.config.economics).create_scenario(name, description, overrides)
    }

    /// Evaluate `scenario` against the expansion plan for `(profile, facility)`.
    ///
    /// Returns an updated copy marked Completed; the input is never modified.
    /// Fails with `MissingData` when an input is absent or the profile is
    /// empty, and with `ExecutionError` when planning or evaluation fails.
    pub fn run_scenario_master_plan(
        &self,
        scenario: Option<&Scenario>,
        profile: &[ProductionPeriod],
        facility: Option<&FacilityDesign>,
    ) -> Result<Scenario, PlanningError> {
        let scenario = scenario.ok_or_else(|| PlanningError::MissingData("scenario is missing".to_string()))?;
        let facility = facility.ok_or_else(|| PlanningError::MissingData("facility design is missing".to_string()))?;
        if profile.is_empty() {
            return Err(PlanningError::MissingData("production profile is missing".to_string()));
        }

        let plan = self.generate_expansion_plan(profile, facility).map_err(|e| {
            error!(scenario = %scenario.name, error = %e, "Expansion planning failed");
            PlanningError::execution(format!("scenario '{}' could not be planned", scenario.name), &e)
        })?;

        self.run_scenario_with_plan(scenario, profile, &plan)
    }

    /// Evaluate `scenario` against a plan that was already generated for `profile`.
    pub fn run_scenario_with_plan(
        &self,
        scenario: &Scenario,
        profile: &[ProductionPeriod],
        plan: &[ExpansionItem],
    ) -> Result<Scenario, PlanningError> {
        let results = ScenarioEvaluator::new(&self.config.economics)
            .evaluate(&scenario.parameters, profile, plan)
            .map_err(|e| {
                error!(scenario = %scenario.name, error = %e, "Scenario evaluation failed");
                PlanningError::execution(format!("scenario '{}' could not be evaluated", scenario.name), &e)
            })?;

        info!(
            scenario = %scenario.name,
            npv = results.npv,
            irr = results.irr,
            total_capex = results.total_capex,
            expansions = results.expansion_count,
            "Scenario run complete"
        );

        let mut updated = scenario.clone();
        updated.results = Some(results);
        updated.status = ScenarioStatus::Completed;
        updated.last_run = Some(Utc::now());
        Ok(updated)
    }

    pub fn clear_caches(&self) {
        self.cost_model.clear_cache();
        self.capacity.clear_cache();
    }

    pub fn cache_stats(&self) -> [CacheStats; 2] {
        [self.cost_model.cache_stats(), self.capacity.cache_stats()]
    }
}
