//! Errors of the best-solution pipeline.

use std::sync::Arc;

use planwright_core::PlanwrightError;
use thiserror::Error;

/// Error type returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a problem change future did not complete normally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProblemChangeError {
    /// Solving ended before a best solution containing the change was delivered.
    #[error("problem change cancelled: solving terminated before it was consumed")]
    Cancelled,

    /// The consumer failed while handling the best solution containing the change.
    #[error("{0}")]
    ConsumerFailed(String),

    /// The change was submitted to a job that is not solving.
    #[error("cannot add the problem change: the solver job is not solving")]
    SolverNotRunning,
}

/// Failure reported to the exception handler of a job's consumers.
#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("best solution consumer failed: {0}")]
    Failed(#[source] BoxError),

    #[error("best solution consumer panicked: {0}")]
    Panicked(String),

    /// The search itself failed, so no final best solution is delivered.
    #[error(transparent)]
    Solver(SolverJobError),
}

impl ConsumerError {
    /// Converts a payload from `catch_unwind`.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        ConsumerError::Panicked(panic_message(payload))
    }
}

/// Extracts the message of a `catch_unwind` payload.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl From<&ConsumerError> for ProblemChangeError {
    fn from(error: &ConsumerError) -> Self {
        ProblemChangeError::ConsumerFailed(error.to_string())
    }
}

/// Why a solver job produced no final best solution.
#[derive(Debug, Clone, Error)]
pub enum SolverJobError {
    #[error("solving failed: {0}")]
    Solving(Arc<PlanwrightError>),

    #[error("solver thread panicked: {0}")]
    Panicked(String),
}

impl From<PlanwrightError> for SolverJobError {
    fn from(error: PlanwrightError) -> Self {
        SolverJobError::Solving(Arc::new(error))
    }
}
