//! Asynchronous Task Runner
//!
//! Executes planning requests off the caller's thread and tracks each one
//! as a [`Task`] record.
//!
//! ## Lifecycle
//! ```text
//! submit() -> pending -> (PROGRESS)* -> processing -> SUCCESS -> completed
//!                                                  \-> ERROR   -> error
//! ```
//!
//! Each task runs on a blocking thread and streams [`WorkerMessage`]s over
//! its own channel. A host-side pump applies them to the task record in
//! order, then forwards them to the [`TaskTicket`]. A worker that dies
//! without a terminal message is recorded as a `WorkerError`.

pub mod protocol;
pub mod worker;

pub use protocol::*;
pub use worker::{execute, ProgressReporter};

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::PlanningEngine;
use crate::error::{ErrorKind, PlanningError};

type TaskTable = Arc<Mutex<HashMap<String, Task>>>;

fn lock(tasks: &TaskTable) -> MutexGuard<'_, HashMap<String, Task>> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Ticket
// ============================================================================

/// Caller's view of one submitted task.
pub struct TaskTicket {
    id: String,
    events: mpsc::UnboundedReceiver<WorkerMessage>,
    tasks: TaskTable,
}

impl TaskTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Next message for this task, in worker order. `None` once the task
    /// has finished and every message has been delivered.
    pub async fn next_event(&mut self) -> Option<WorkerMessage> {
        self.events.recv().await
    }

    /// Wait for the task to finish and return its final record.
    pub async fn wait(mut self) -> Result<Task, PlanningError> {
        while let Some(message) = self.events.recv().await {
            if message.event.is_terminal() {
                break;
            }
        }
        lock(&self.tasks)
            .get(&self.id)
            .cloned()
            .ok_or_else(|| PlanningError::Worker(format!("task {} is not tracked", self.id)))
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Host side of the task runner. Cheap to clone; clones share task state.
#[derive(Clone)]
pub struct TaskRunner {
    engine: Arc<PlanningEngine>,
    tasks: TaskTable,
    processing: Arc<AtomicBool>,
}

impl TaskRunner {
    pub fn new(engine: Arc<PlanningEngine>) -> Self {
        Self {
            engine,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            processing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn engine(&self) -> &Arc<PlanningEngine> {
        &self.engine
    }

    /// Queue `request` and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: TaskRequest) -> TaskTicket {
        let id = Uuid::new_v4().to_string();
        let task_type = request.task_type();

        lock(&self.tasks).insert(id.clone(), Task::pending(id.clone(), task_type));
        self.processing.store(true, Ordering::SeqCst);
        info!(task_id = %id, task_type = %task_type, "Task submitted");

        let (worker_tx, worker_rx) = mpsc::unbounded_channel();
        let (ticket_tx, ticket_rx) = mpsc::unbounded_channel();

        let engine = Arc::clone(&self.engine);
        let worker_id = id.clone();
        let worker = tokio::task::spawn_blocking(move || {
            let mut reporter = ProgressReporter::new(worker_id.clone(), worker_tx.clone());
            reporter.report(0, "Task started");

            let event = match execute(&engine, request, &mut reporter) {
                Ok(output) => WorkerEvent::Success(output),
                Err(e) => {
                    warn!(task_id = %worker_id, code = %e.kind(), error = %e, "Task failed");
                    WorkerEvent::Error(TaskFailure::from(&e))
                }
            };
            if worker_tx.send(WorkerMessage { id: worker_id, event }).is_err() {
                warn!("Host stopped listening before task finished");
            }
        });

        tokio::spawn(pump(
            id.clone(),
            worker,
            worker_rx,
            ticket_tx,
            Arc::clone(&self.tasks),
            Arc::clone(&self.processing),
        ));

        TaskTicket {
            id,
            events: ticket_rx,
            tasks: Arc::clone(&self.tasks),
        }
    }

    /// Snapshot of one task.
    pub fn task(&self, id: &str) -> Option<Task> {
        lock(&self.tasks).get(id).cloned()
    }

    /// Snapshot of every task, oldest first.
    pub fn tasks(&self) -> Vec<Task> {
        let mut all: Vec<Task> = lock(&self.tasks).values().cloned().collect();
        all.sort_by_key(|t| t.submitted_at);
        all
    }

    /// Set on every submit and cleared on every terminal message, so with
    /// overlapping tasks it reads false as soon as any one finishes. Use
    /// [`outstanding`](Self::outstanding) for an exact answer.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Number of tasks not yet completed or failed.
    pub fn outstanding(&self) -> usize {
        lock(&self.tasks).values().filter(|t| !t.status.is_terminal()).count()
    }
}

/// Apply worker messages to the task table in arrival order.
async fn pump(
    id: String,
    worker: JoinHandle<()>,
    mut worker_rx: mpsc::UnboundedReceiver<WorkerMessage>,
    ticket_tx: mpsc::UnboundedSender<WorkerMessage>,
    tasks: TaskTable,
    processing: Arc<AtomicBool>,
) {
    while let Some(message) = worker_rx.recv().await {
        let terminal = deliver(&message, &ticket_tx, &tasks, &processing);
        if terminal {
            return;
        }
    }

    // Channel closed without SUCCESS/ERROR: the worker died.
    let reason = match worker.await {
        Ok(()) => "worker exited without a result".to_string(),
        Err(e) => describe_join_error(e),
    };
    error!(task_id = %id, %reason, "Worker failed");

    let message = WorkerMessage {
        id,
        event: WorkerEvent::Error(TaskFailure {
            message: reason,
            code: ErrorKind::WorkerError,
            details: Vec::new(),
        }),
    };
    deliver(&message, &ticket_tx, &tasks, &processing);
}

/// Record one message and forward it to the ticket. Returns whether it was terminal.
fn deliver(
    message: &WorkerMessage,
    ticket_tx: &mpsc::UnboundedSender<WorkerMessage>,
    tasks: &TaskTable,
    processing: &AtomicBool,
) -> bool {
    let terminal = message.event.is_terminal();
    match lock(tasks).get_mut(&message.id) {
        Some(task) => task.apply(&message.event),
        None => warn!(task_id = %message.id, "Message for unknown task"),
    }
    if terminal {
        processing.store(false, Ordering::SeqCst);
        debug!(task_id = %message.id, "Task finished");
    }
    // The ticket may have been dropped; the task table is still updated.
    let _ = ticket_tx.send(message.clone());
    terminal
}

fn describe_join_error(e: JoinError) -> String {
    if e.is_panic() {
        format!("worker panicked: {}", panic_message(e.into_panic().as_ref()))
    } else {
        format!("worker was cancelled: {e}")
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
