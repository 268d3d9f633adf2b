//! Task Runner Tests
//!
//! Drives the asynchronous runner end to end: message ordering, the task
//! state machine and error codes reported over the wire.

use std::sync::Arc;

use facility_planner::runner::{
    ExpansionPlanPayload, FullAnalysisPayload, TaskOutput, TaskRequest, TaskRunner, TaskTicket,
    WorkerEvent, WorkerMessage,
};
use facility_planner::types::{CapexRequest, ParameterOverrides, ProjectInfo};
use facility_planner::{ErrorKind, FacilityDesign, PlanningEngine, ProductionPeriod, TaskStatus};

fn runner() -> TaskRunner {
    TaskRunner::new(Arc::new(PlanningEngine::default()))
}

fn full_payload(engine: &PlanningEngine) -> FullAnalysisPayload {
    FullAnalysisPayload {
        project: Some(ProjectInfo {
            project_id: "P-100".into(),
            name: "North Field Redevelopment".into(),
            field: "North Field".into(),
            operator: "Example Energy".into(),
        }),
        facility: Some(FacilityDesign::new("FPSO", 100_000.0, 100.0, 50_000.0)),
        profile: vec![
            ProductionPeriod::new(2024, 90_000.0, 80.0, 20_000.0),
            ProductionPeriod::new(2025, 120_000.0, 110.0, 30_000.0),
            ProductionPeriod::new(2026, 140_000.0, 120.0, 45_000.0),
        ],
        scenarios: vec![
            engine.create_scenario(
                "Low Price",
                "",
                &ParameterOverrides {
                    oil_price: Some(45.0),
                    ..ParameterOverrides::default()
                },
            ),
            engine.create_scenario("Base", "", &ParameterOverrides::default()),
        ],
    }
}

async fn collect(ticket: &mut TaskTicket) -> Vec<WorkerMessage> {
    let mut messages = Vec::new();
    while let Some(message) = ticket.next_event().await {
        messages.push(message);
    }
    messages
}

fn progress_values(messages: &[WorkerMessage]) -> Vec<u8> {
    messages
        .iter()
        .filter_map(|m| match m.event {
            WorkerEvent::Progress { progress, .. } => Some(progress),
            _ => None,
        })
        .collect()
}

/// Exactly one terminal message, and it is the last one.
fn assert_single_terminal(messages: &[WorkerMessage]) {
    let terminals = messages.iter().filter(|m| m.event.is_terminal()).count();
    assert_eq!(terminals, 1, "{messages:?}");
    assert!(messages.last().is_some_and(|m| m.event.is_terminal()));
}

#[tokio::test]
async fn full_analysis_reports_progress_then_success() {
    let runner = runner();
    let payload = full_payload(runner.engine());
    let mut ticket = runner.submit(TaskRequest::RunFullAnalysis(payload));
    let id = ticket.id().to_string();

    let messages = collect(&mut ticket).await;
    assert!(messages.iter().all(|m| m.id == id));
    assert_single_terminal(&messages);
    assert_eq!(progress_values(&messages), vec![0, 20, 50, 75, 95, 100]);

    let task = runner.task(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100);
    assert!(task.completed_at.is_some());

    let Some(TaskOutput::FullAnalysis(report)) = task.result else {
        panic!("expected a full analysis report");
    };
    assert_eq!(report.capacity_analysis.len(), 3);
    assert_eq!(report.bottleneck_years.oil, vec![2025, 2026]);
    assert_eq!(report.bottleneck_years.gas, vec![2025, 2026]);
    assert!(report.bottleneck_years.water.is_empty());

    let total: f64 = report.expansion_plan.iter().map(|item| item.estimated_capex).sum();
    assert_eq!(report.total_expansion_capex, total);

    let names: Vec<&str> = report.scenario_results.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Base", "Low Price"]);
    assert!(report.scenario_results.iter().all(|s| s.is_completed()));
}

#[tokio::test]
async fn invalid_inputs_fail_with_validation_error() {
    let runner = runner();
    let ticket = runner.submit(TaskRequest::RunFullAnalysis(FullAnalysisPayload {
        profile: vec![ProductionPeriod::new(2024, -10.0, 0.0, 0.0)],
        ..FullAnalysisPayload::default()
    }));

    let task = ticket.wait().await.unwrap();
    assert_eq!(task.status, TaskStatus::Error);
    assert!(task.result.is_none());

    let failure = task.error.unwrap();
    assert_eq!(failure.code, ErrorKind::ValidationError);
    assert_eq!(failure.details.len(), 3, "{:?}", failure.details);
    assert!(failure.details.iter().any(|d| d.contains("Year 2024: oil")));
}

#[tokio::test]
async fn expansion_plan_task_returns_plan() {
    let runner = runner();
    let mut ticket = runner.submit(TaskRequest::GenerateExpansionPlan(ExpansionPlanPayload {
        facility: Some(FacilityDesign::new("Onshore", 100_000.0, 100.0, 50_000.0)),
        profile: vec![
            ProductionPeriod::new(2024, 90_000.0, 0.0, 0.0),
            ProductionPeriod::new(2025, 120_000.0, 0.0, 0.0),
            ProductionPeriod::new(2026, 140_000.0, 0.0, 0.0),
        ],
    }));

    let messages = collect(&mut ticket).await;
    assert_single_terminal(&messages);

    let Some(WorkerEvent::Success(TaskOutput::ExpansionPlan(plan))) = messages.last().map(|m| m.event.clone()) else {
        panic!("expected an expansion plan, got {messages:?}");
    };
    let additions: Vec<(i32, f64)> = plan.iter().map(|i| (i.year, i.capacity_addition)).collect();
    assert_eq!(additions, vec![(2025, 25_000.0), (2026, 25_000.0)]);
}

#[tokio::test]
async fn expansion_plan_without_facility_is_missing_data() {
    let runner = runner();
    let ticket = runner.submit(TaskRequest::GenerateExpansionPlan(ExpansionPlanPayload {
        facility: None,
        profile: vec![ProductionPeriod::new(2024, 1.0, 0.0, 0.0)],
    }));
    let task = ticket.wait().await.unwrap();
    assert_eq!(task.error.map(|e| e.code), Some(ErrorKind::MissingData));
}

#[tokio::test]
async fn expansion_plan_with_negative_rates_fails_validation() {
    let runner = runner();
    let mut ticket = runner.submit(TaskRequest::GenerateExpansionPlan(ExpansionPlanPayload {
        facility: Some(FacilityDesign::new("Onshore", 100_000.0, 100.0, 50_000.0)),
        profile: vec![
            ProductionPeriod::new(2024, 90_000.0, 0.0, 0.0),
            ProductionPeriod::new(2025, -120_000.0, 0.0, 0.0),
            ProductionPeriod::new(2026, 140_000.0, f64::INFINITY, 0.0),
        ],
    }));

    let messages = collect(&mut ticket).await;
    assert_single_terminal(&messages);
    assert!(!messages.iter().any(|m| matches!(m.event, WorkerEvent::Success(_))));

    let task = runner.task(ticket.id()).unwrap();
    assert_eq!(task.status, TaskStatus::Error);
    assert!(task.result.is_none());

    let failure = task.error.unwrap();
    assert_eq!(failure.code, ErrorKind::ValidationError);
    assert_eq!(failure.details.len(), 2, "{:?}", failure.details);
    assert!(failure.details[0].contains("Year 2025: oil"));
    assert!(failure.details[1].contains("Year 2026: gas"));
}

#[tokio::test]
async fn capex_batch_progress_is_strictly_increasing() {
    let runner = runner();
    let items: Vec<CapexRequest> = ["FPSO", "Compression", "Water Treatment", "Power Generation", "Mystery Unit"]
        .iter()
        .enumerate()
        .map(|(i, facility_type)| CapexRequest {
            id: Some(format!("req-{i}")),
            facility_type: (*facility_type).to_string(),
            capacity: 40.0,
        })
        .collect();

    let mut ticket = runner.submit(TaskRequest::CalculateCapexBatch(items));
    let messages = collect(&mut ticket).await;
    assert_single_terminal(&messages);

    let progress = progress_values(&messages);
    assert!(progress.windows(2).all(|w| w[0] < w[1]), "{progress:?}");
    assert_eq!(progress.last(), Some(&100));

    let task = runner.task(ticket.id()).unwrap();
    let Some(TaskOutput::CapexBatch(estimates)) = task.result else {
        panic!("expected capex estimates");
    };
    assert_eq!(estimates.len(), 5);
    assert_eq!(estimates[4].id.as_deref(), Some("req-4"));
    assert!(estimates.iter().all(|e| e.estimated_capex > 0.0));
}

#[tokio::test]
async fn capex_batch_with_bad_item_is_invalid_input() {
    let runner = runner();
    let ticket = runner.submit(TaskRequest::CalculateCapexBatch(vec![CapexRequest {
        id: None,
        facility_type: "FPSO".into(),
        capacity: -1.0,
    }]));
    let task = ticket.wait().await.unwrap();
    assert_eq!(task.status, TaskStatus::Error);
    assert_eq!(task.error.map(|e| e.code), Some(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn concurrent_tasks_are_tracked_independently() {
    let runner = runner();
    let tickets: Vec<TaskTicket> = (1..=4)
        .map(|i| {
            runner.submit(TaskRequest::CalculateCapexBatch(vec![CapexRequest {
                id: None,
                facility_type: "Separation".into(),
                capacity: f64::from(i) * 5_000.0,
            }]))
        })
        .collect();
    assert!(runner.is_processing());

    let mut ids = Vec::new();
    for ticket in tickets {
        let task = ticket.wait().await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        ids.push(task.id);
    }

    assert_eq!(runner.outstanding(), 0);
    assert!(!runner.is_processing());

    let tracked = runner.tasks();
    assert_eq!(tracked.len(), 4);
    assert!(ids.iter().all(|id| tracked.iter().any(|t| &t.id == id)));
}

#[test]
fn empty_batch_completes_with_no_estimates() {
    let task = tokio_test::block_on(async {
        let runner = runner();
        runner.submit(TaskRequest::CalculateCapexBatch(Vec::new())).wait().await
    })
    .unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result, Some(TaskOutput::CapexBatch(Vec::new())));
}
