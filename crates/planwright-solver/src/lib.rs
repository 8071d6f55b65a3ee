//! Planwright solver runtime.
//!
//! This crate runs an injected search against a score director and moves
//! its results to the application:
//! - Solver jobs and the solver manager (one thread per job)
//! - Real-time problem changes with completion futures
//! - The versioned best-solution holder and consumer support
//! - Termination conditions
//!
//! # Threads
//!
//! Each job has a solver thread, which owns the working solution, and a
//! consumer thread, which runs every user callback. Problem changes may be
//! submitted from any thread.
//!
//! ```
//! use planwright_config::SolverConfig;
//! use planwright_scoring::ScoreDirectorFactory;
//! use planwright_solver::{FnSolver, Solver, SolverManager};
//! use planwright_test::nqueens::{calculate_conflicts, nqueens_descriptor, NQueensSolution};
//!
//! let manager = SolverManager::new(
//!     ScoreDirectorFactory::easy(nqueens_descriptor(), calculate_conflicts),
//!     || -> Box<dyn Solver<NQueensSolution>> {
//!         Box::new(FnSolver::<NQueensSolution, _>::new(|_scope| Ok(())))
//!     },
//!     SolverConfig::default(),
//! );
//!
//! let job = manager.solve("board", NQueensSolution::with_rows(&[0, 2])).unwrap();
//! let best = job.final_best_solution().unwrap();
//! assert_eq!(best.score.map(|s| s.score()), Some(0));
//! ```

pub mod error;
pub mod manager;
pub mod realtime;
pub mod scope;
pub mod solver;
pub mod termination;

// ============================================================================
// Errors
// ============================================================================

pub use error::{BoxError, ConsumerError, ProblemChangeError, SolverJobError};

// ============================================================================
// Jobs
// ============================================================================

pub use manager::{SolverFactory, SolverJob, SolverManager, SolverStatus};
pub use scope::SolverScope;
pub use solver::{FnSolver, Solver};

// ============================================================================
// Real-time Planning
// ============================================================================

pub use realtime::{
    BestSolutionConsumers, BestSolutionHolder, BoxedProblemChange, ClosureProblemChange,
    ConsumerSupport, ProblemChange, ProblemChangeCompleter, ProblemChangeFuture,
    ProblemChangeOutcome, ProblemChangeReceiver, ProblemChangeResult, SolverHandle,
};

// ============================================================================
// Termination
// ============================================================================

pub use termination::{
    build_termination, ExternalTermination, OrTermination, ScoreCalculationCountTermination,
    Termination, TimeSpentTermination,
};
