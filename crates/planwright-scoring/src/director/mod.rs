//! Score director implementations.
//!
//! The score director owns the working solution, keeps its init score and
//! shadow variables up to date and calculates scores through a
//! [`ScoreCalculator`](crate::ScoreCalculator).
//!
//! # Types
//!
//! - [`ScoreDirector`] - the mutation protocol seen by moves and problem changes
//! - [`DefaultScoreDirector`] - the implementation, with corruption diagnostics
//! - [`ScoreDirectorFactory`] - builds directors and wires assertion directors
//! - [`SolutionCloner`] - planning clones of solutions

mod analysis;
mod cloner;
mod factory;
mod score_director;
mod traits;

#[cfg(test)]
mod tests;

pub use cloner::{CloneSolutionCloner, SolutionCloner};
pub use factory::{CalculatorFactory, ScoreDirectorFactory};
pub use score_director::DefaultScoreDirector;
pub use traits::ScoreDirector;
