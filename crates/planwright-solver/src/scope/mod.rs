//! Scope of one solving run.
//!
//! [`SolverScope`] holds the score director of the working solution, the
//! best solution found so far and the hooks into the job that runs it.

mod solver;

pub use solver::SolverScope;
