//! Solver jobs and the manager running them.
//!
//! A [`SolverManager`] owns the score director factory, a factory for the
//! search and the solver configuration. Every submitted problem becomes a
//! [`SolverJob`] solved on its own thread:
//!
//! ```text
//! SolvingScheduled ──▶ SolvingActive ──▶ NotSolving
//!        │                                   ▲
//!        └──────── terminate_early ──────────┘
//! ```
//!
//! Best solutions flow from the job's solver thread through a
//! [`BestSolutionHolder`](crate::realtime::BestSolutionHolder) to the job's
//! consumer thread; problem changes submitted through the job or the manager
//! resolve once a consumed best solution contains them.

mod solver_job;
mod solver_manager;


pub use solver_job::{SolverJob, SolverStatus};
pub use solver_manager::{SolverFactory, SolverManager};
