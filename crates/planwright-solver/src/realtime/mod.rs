//! Real-time planning support.
//!
//! Problem changes are submitted while the solver is running and applied on
//! the solver thread. Each submission returns a [`ProblemChangeFuture`] that
//! resolves once a best solution containing the change has been handed to
//! the consumer, or is cancelled when solving ends first.
//!
//! # Overview
//!
//! - [`SolverHandle`] / [`ProblemChangeReceiver`]: the change queue between
//!   callers and the solver thread, with an in-flight count
//! - [`BestSolutionHolder`]: the versioned mailbox pairing best solutions
//!   with the changes they contain
//! - [`ConsumerSupport`]: the worker thread that runs the user callbacks
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use planwright_solver::realtime::{
//!     BestSolutionHolder, ClosureProblemChange, SolverHandle,
//! };
//! use planwright_test::schedule::Schedule;
//!
//! let (handle, receiver) = SolverHandle::<Schedule>::new();
//! let holder = Arc::new(BestSolutionHolder::new());
//! handle.set_solving(true);
//!
//! let change = ClosureProblemChange::<Schedule, _>::new("noop", |_| Ok(()));
//! let mut future = holder.add_problem_change(&handle, Box::new(change));
//!
//! // The solver thread applies the change, then publishes a best solution.
//! receiver.mark_processed(receiver.drain_pending().len());
//! assert!(holder.set(Schedule::unassigned(1, 1), || handle.is_every_problem_change_processed()));
//!
//! let mut best = holder.take().unwrap();
//! best.complete_changes();
//! assert_eq!(future.try_result(), Some(Ok(())));
//! ```

mod best_solution_holder;
mod consumer_support;
mod future;
mod problem_change;
mod solver_handle;

pub use best_solution_holder::{BestSolutionHolder, VersionedBestSolution};
pub use consumer_support::{
    BestSolutionConsumer, BestSolutionConsumers, ConsumerSupport, ExceptionHandler,
    FinalBestSolutionConsumer,
};
pub use future::{
    problem_change_channel, ProblemChangeCompleter, ProblemChangeFuture, ProblemChangeOutcome,
};
pub use problem_change::{BoxedProblemChange, ClosureProblemChange, ProblemChange};
pub use solver_handle::{ProblemChangeReceiver, ProblemChangeResult, SolverHandle};
