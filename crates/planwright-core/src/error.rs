//! Error types for Planwright

use thiserror::Error;

use crate::domain::PlanningIdValue;

/// Main error type for Planwright operations.
///
/// Configuration errors are raised as soon as a broken model or cloner is
/// detected. Corruption errors are only produced by the assertion modes and
/// carry a rendered diagnostic report.
#[derive(Debug, Error)]
pub enum PlanwrightError {
    /// Error in the domain model or solver configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A fact or entity that must be looked up has no planning id
    #[error(
        "The planning id of the {type_name} at index {index} must not be None.\n\
         Maybe initialize the planning id of the original object before solving."
    )]
    MissingPlanningId {
        type_name: &'static str,
        index: usize,
    },

    /// Two working objects of the same type share a planning id
    #[error(
        "The working objects of type {type_name} at index {existing} and index {duplicate} \
         have the same planning id ({id})."
    )]
    DuplicatePlanningId {
        type_name: &'static str,
        id: PlanningIdValue,
        existing: usize,
        duplicate: usize,
    },

    /// The lookup has no working object for the given planning id
    #[error("The {type_name} with planning id ({id}) has no working object.")]
    UnknownWorkingObject {
        type_name: String,
        id: PlanningIdValue,
    },

    /// A lookup was requested from a score director created without one
    #[error(
        "Lookup is not enabled for this score director.\n\
         Maybe enable lookup in the score director configuration."
    )]
    LookupDisabled,

    /// The score calculator returned a score that is not fully initialized
    #[error(
        "The score calculator returned a score ({0}) with a non-zero init score.\n\
         The init score is maintained by the score director; calculators must leave it at zero."
    )]
    CalculatorInitScore(String),

    /// The user-supplied solution cloner broke an invariant
    #[error("Cloning corruption: {0}")]
    CloningCorruption(String),

    /// The incremental score does not match a from-scratch calculation
    #[error("{0}")]
    ScoreCorruption(String),

    /// A shadow variable was not updated by its listener
    #[error("{0}")]
    ShadowVariableCorruption(String),

    /// Undoing a move did not restore the score from before the move
    #[error("{0}")]
    UndoMoveCorruption(String),

    /// Invalid operation for the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for Planwright operations
pub type Result<T> = std::result::Result<T, PlanwrightError>;
