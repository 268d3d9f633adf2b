//! Planning engine error taxonomy.
//!
//! Callers match on [`PlanningError::kind`] rather than on the variant text.
//! The task runner turns every error into an `ERROR` message carrying the
//! kind as its `code`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Serializable error tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    ValidationError,
    MissingData,
    ExecutionError,
    WorkerError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidInput => "InvalidInput",
            Self::ValidationError => "ValidationError",
            Self::MissingData => "MissingData",
            Self::ExecutionError => "ExecutionError",
            Self::WorkerError => "WorkerError",
        };
        f.write_str(s)
    }
}

/// Errors raised by the cost model, evaluator and task runner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Bad arguments to the cost model; nothing was computed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Scenario-level input validation failed
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A required input (scenario, profile, facility) was not supplied
    #[error("missing data: {0}")]
    MissingData(String),

    /// Scenario evaluation failed after its preconditions held
    #[error("{message}: {cause}")]
    Execution { message: String, cause: String },

    /// Uncategorized failure inside the asynchronous boundary
    #[error("worker error: {0}")]
    Worker(String),
}

impl PlanningError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::MissingData(_) => ErrorKind::MissingData,
            Self::Execution { .. } => ErrorKind::ExecutionError,
            Self::Worker(_) => ErrorKind::WorkerError,
        }
    }

    /// Validation messages, where the error carries a list of them.
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::Execution { cause, .. } => vec![cause.clone()],
            _ => Vec::new(),
        }
    }

    pub(crate) fn execution(message: impl Into<String>, cause: &Self) -> Self {
        Self::Execution {
            message: message.into(),
            cause: cause.to_string(),
        }
    }
}
