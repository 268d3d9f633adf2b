//! Worker-side task execution.
//!
//! Runs on a blocking thread. Progress is pushed to the host through the
//! task's channel; the final `SUCCESS`/`ERROR` is sent by the caller of
//! [`execute`].

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::protocol::{
    BottleneckYears, ExpansionPlanPayload, FullAnalysisPayload, FullAnalysisReport, TaskOutput,
    TaskRequest, WorkerEvent, WorkerMessage,
};
use crate::config::defaults;
use crate::engine::{
    rank_scenarios, validate_analysis_inputs, validate_profile_rates, PlanningEngine, RankingMetric, SortDirection,
};
use crate::error::PlanningError;
use crate::types::{total_capex, CapexEstimate, CapexRequest, Commodity, ExpansionItem};

/// Sends `PROGRESS` messages for one task, dropping any that would not
/// advance the reported percentage.
pub struct ProgressReporter {
    id: String,
    tx: mpsc::UnboundedSender<WorkerMessage>,
    last: Option<u8>,
}

impl ProgressReporter {
    pub const fn new(id: String, tx: mpsc::UnboundedSender<WorkerMessage>) -> Self {
        Self { id, tx, last: None }
    }

    pub fn report(&mut self, progress: u8, message: impl Into<String>) {
        let progress = progress.min(defaults::PROGRESS_COMPLETE);
        if self.last.is_some_and(|last| progress <= last) {
            return;
        }
        self.last = Some(progress);

        let message = message.into();
        debug!(task_id = %self.id, progress, %message, "Task progress");
        let sent = self.tx.send(WorkerMessage {
            id: self.id.clone(),
            event: WorkerEvent::Progress { progress, message },
        });
        if sent.is_err() {
            warn!(task_id = %self.id, "Host stopped listening for progress");
        }
    }

    pub const fn last_progress(&self) -> Option<u8> {
        self.last
    }
}

/// Run one request to completion.
pub fn execute(
    engine: &PlanningEngine,
    request: TaskRequest,
    reporter: &mut ProgressReporter,
) -> Result<TaskOutput, PlanningError> {
    match request {
        TaskRequest::RunFullAnalysis(payload) => {
            run_full_analysis(engine, payload, reporter).map(|report| TaskOutput::FullAnalysis(Box::new(report)))
        }
        TaskRequest::GenerateExpansionPlan(payload) => {
            run_expansion_plan(engine, payload, reporter).map(TaskOutput::ExpansionPlan)
        }
        TaskRequest::CalculateCapexBatch(items) => {
            run_capex_batch(engine, &items, reporter).map(TaskOutput::CapexBatch)
        }
    }
}

fn run_full_analysis(
    engine: &PlanningEngine,
    payload: FullAnalysisPayload,
    reporter: &mut ProgressReporter,
) -> Result<FullAnalysisReport, PlanningError> {
    let FullAnalysisPayload {
        project,
        facility,
        profile,
        scenarios,
    } = payload;

    let validation = validate_analysis_inputs(project.as_ref(), facility.as_ref(), &profile);
    if !validation.valid {
        return Err(PlanningError::Validation(validation.errors));
    }
    for warning in &validation.warnings {
        warn!(%warning, "Analysis input warning");
    }
    reporter.report(defaults::PROGRESS_VALIDATED, "Inputs validated");

    let facility = facility.ok_or_else(|| PlanningError::MissingData("facility design is missing".to_string()))?;
    let analysis = engine.analyze_capacity(&profile, Some(&facility));
    if !analysis.valid {
        return Err(PlanningError::MissingData(
            analysis.error.unwrap_or_else(|| "capacity analysis failed".to_string()),
        ));
    }
    reporter.report(defaults::PROGRESS_CAPACITY_ANALYZED, "Capacity analysis complete");

    let plan = engine.plan_from_analysis(&profile, &facility, &analysis)?;
    reporter.report(
        defaults::PROGRESS_EXPANSION_PLANNED,
        format!("Expansion plan generated ({} items)", plan.len()),
    );

    let total_expansion_capex = total_capex(&plan);
    let completed = scenarios
        .iter()
        .map(|scenario| engine.run_scenario_with_plan(scenario, &profile, &plan))
        .collect::<Result<Vec<_>, _>>()?;
    let scenario_results = rank_scenarios(&completed, RankingMetric::Npv, SortDirection::Descending);
    reporter.report(defaults::PROGRESS_COST_AGGREGATED, "Costs aggregated");

    let bottleneck_years = BottleneckYears {
        oil: analysis.bottleneck_years(Commodity::Oil),
        gas: analysis.bottleneck_years(Commodity::Gas),
        water: analysis.bottleneck_years(Commodity::Water),
    };

    info!(
        periods = profile.len(),
        expansions = plan.len(),
        total_expansion_capex,
        scenarios = scenario_results.len(),
        "Full analysis complete"
    );
    reporter.report(defaults::PROGRESS_COMPLETE, "Analysis complete");

    Ok(FullAnalysisReport {
        project,
        validation_warnings: validation.warnings,
        capacity_analysis: analysis.entries,
        expansion_plan: plan,
        total_expansion_capex,
        bottleneck_years,
        scenario_results,
    })
}

fn run_expansion_plan(
    engine: &PlanningEngine,
    payload: ExpansionPlanPayload,
    reporter: &mut ProgressReporter,
) -> Result<Vec<ExpansionItem>, PlanningError> {
    let facility = payload
        .facility
        .ok_or_else(|| PlanningError::MissingData("facility design is missing".to_string()))?;
    if payload.profile.is_empty() {
        return Err(PlanningError::MissingData("production profile is missing".to_string()));
    }
    let rate_errors = validate_profile_rates(&payload.profile);
    if !rate_errors.is_empty() {
        return Err(PlanningError::Validation(rate_errors));
    }

    let analysis = engine.analyze_capacity(&payload.profile, Some(&facility));
    reporter.report(defaults::PROGRESS_CAPACITY_ANALYZED, "Capacity analysis complete");

    let plan = engine.plan_from_analysis(&payload.profile, &facility, &analysis)?;
    reporter.report(
        defaults::PROGRESS_COMPLETE,
        format!("Expansion plan generated ({} items)", plan.len()),
    );
    Ok(plan)
}

fn run_capex_batch(
    engine: &PlanningEngine,
    items: &[CapexRequest],
    reporter: &mut ProgressReporter,
) -> Result<Vec<CapexEstimate>, PlanningError> {
    let total = items.len();
    let mut estimates = Vec::with_capacity(total);

    for (index, item) in items.iter().enumerate() {
        let estimated_capex = engine
            .estimate_capex(&item.facility_type, item.capacity)
            .map_err(|e| match e {
                PlanningError::InvalidInput(msg) => PlanningError::InvalidInput(format!("batch item {index}: {msg}")),
                other => other,
            })?;
        estimates.push(CapexEstimate {
            id: item.id.clone(),
            facility_type: item.facility_type.clone(),
            capacity: item.capacity,
            estimated_capex,
        });

        let done = index + 1;
        let percent = u8::try_from(done * 100 / total).unwrap_or(defaults::PROGRESS_COMPLETE);
        reporter.report(percent, format!("Estimated {done} of {total}"));
    }

    reporter.report(defaults::PROGRESS_COMPLETE, format!("Estimated {total} items"));
    Ok(estimates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{FacilityDesign, ProductionPeriod, ProjectInfo};

    fn reporter() -> (ProgressReporter, mpsc::UnboundedReceiver<WorkerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ProgressReporter::new("t".into(), tx), rx)
    }

    fn progress_values(rx: &mut mpsc::UnboundedReceiver<WorkerMessage>) -> Vec<u8> {
        let mut values = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let WorkerEvent::Progress { progress, .. } = message.event {
                values.push(progress);
            }
        }
        values
    }

    #[test]
    fn reporter_drops_non_increasing_progress() {
        let (mut reporter, mut rx) = reporter();
        reporter.report(0, "start");
        reporter.report(30, "a");
        reporter.report(30, "again");
        reporter.report(10, "back");
        reporter.report(250, "past the end");
        assert_eq!(progress_values(&mut rx), vec![0, 30, 100]);
        assert_eq!(reporter.last_progress(), Some(100));
    }

    #[test]
    fn full_analysis_hits_every_checkpoint() {
        let engine = PlanningEngine::default();
        let (mut reporter, mut rx) = reporter();
        let payload = FullAnalysisPayload {
            project: Some(ProjectInfo::default()),
            facility: Some(FacilityDesign::new("FPSO", 100_000.0, 100.0, 50_000.0)),
            profile: vec![
                ProductionPeriod::new(2024, 90_000.0, 50.0, 10_000.0),
                ProductionPeriod::new(2025, 120_000.0, 60.0, 20_000.0),
            ],
            scenarios: vec![engine.create_scenario("Base", "", &Default::default())],
        };

        let output = execute(&engine, TaskRequest::RunFullAnalysis(payload), &mut reporter).unwrap();
        assert_eq!(progress_values(&mut rx), vec![20, 50, 75, 95, 100]);

        let TaskOutput::FullAnalysis(report) = output else {
            panic!("expected a full analysis report");
        };
        assert_eq!(report.bottleneck_years.oil, vec![2025]);
        assert_eq!(report.expansion_plan.len(), 1);
        assert_eq!(report.scenario_results.len(), 1);
        assert!(report.scenario_results[0].is_completed());
    }

    #[test]
    fn invalid_inputs_fail_with_every_message() {
        let engine = PlanningEngine::default();
        let (mut reporter, mut rx) = reporter();
        let err = execute(
            &engine,
            TaskRequest::RunFullAnalysis(FullAnalysisPayload::default()),
            &mut reporter,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.details().len(), 3, "{:?}", err.details());
        assert!(progress_values(&mut rx).is_empty());
    }

    #[test]
    fn expansion_plan_rejects_negative_rates() {
        let engine = PlanningEngine::default();
        let (mut reporter, mut rx) = reporter();
        let payload = ExpansionPlanPayload {
            facility: Some(FacilityDesign::new("Onshore", 100_000.0, 100.0, 50_000.0)),
            profile: vec![
                ProductionPeriod::new(2024, 90_000.0, 0.0, 0.0),
                ProductionPeriod::new(2025, -120_000.0, 0.0, 0.0),
            ],
        };
        let err = execute(&engine, TaskRequest::GenerateExpansionPlan(payload), &mut reporter).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.details().len(), 1, "{:?}", err.details());
        assert!(err.details()[0].contains("Year 2025: oil"));
        assert!(progress_values(&mut rx).is_empty());
    }

    #[test]
    fn capex_batch_reports_increasing_progress() {
        let engine = PlanningEngine::default();
        let (mut reporter, mut rx) = reporter();
        let items: Vec<CapexRequest> = (1..=3)
            .map(|i| CapexRequest {
                id: Some(format!("item-{i}")),
                facility_type: "Separation".into(),
                capacity: f64::from(i) * 10_000.0,
            })
            .collect();

        let output = execute(&engine, TaskRequest::CalculateCapexBatch(items), &mut reporter).unwrap();
        let TaskOutput::CapexBatch(estimates) = output else {
            panic!("expected capex estimates");
        };
        assert_eq!(estimates.len(), 3);
        assert_eq!(estimates[2].id.as_deref(), Some("item-3"));
        assert!(estimates[0].estimated_capex < estimates[2].estimated_capex);
        assert_eq!(progress_values(&mut rx), vec![33, 66, 100]);
    }

    #[test]
    fn capex_batch_stops_at_first_bad_item() {
        let engine = PlanningEngine::default();
        let (mut reporter, _rx) = reporter();
        let items = vec![
            CapexRequest {
                id: None,
                facility_type: "Separation".into(),
                capacity: 10_000.0,
            },
            CapexRequest {
                id: None,
                facility_type: "Separation".into(),
                capacity: -1.0,
            },
        ];
        let err = execute(&engine, TaskRequest::CalculateCapexBatch(items), &mut reporter).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("batch item 1"));
    }
}
