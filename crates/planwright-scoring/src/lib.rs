//! Score directors for Planwright.
//!
//! This crate keeps the score of a working solution honest:
//! - Score calculators (`EasyScoreCalculator`, `MatchingScoreCalculator`)
//! - The score director mutation protocol and its default implementation
//! - Corruption diagnostics: from-scratch scores, stale shadow variables,
//!   undo moves and broken solution cloners
//! - Reversible moves
//!
//! # Architecture
//!
//! The director forwards every before/after hook to the variable listener
//! support of `planwright-core` and to the score calculator. The init score
//! is kept by the director, never by the calculator.

pub mod calculator;
pub mod constraint_match;
pub mod director;
pub mod moves;

// ============================================================================
// Score Calculators
// ============================================================================

pub use calculator::{EasyScoreCalculator, MatchingScoreCalculator, ScoreCalculator};
pub use constraint_match::{ConstraintMatch, ConstraintMatchKey, ConstraintMatchTotal};

// ============================================================================
// Score Directors
// ============================================================================

pub use director::{
    CalculatorFactory, CloneSolutionCloner, DefaultScoreDirector, ScoreDirector,
    ScoreDirectorFactory, SolutionCloner,
};

// ============================================================================
// Moves
// ============================================================================

pub use moves::{ChangeMove, ListAssignMove, ListUnassignMove, ListVariableAccess, Move};
