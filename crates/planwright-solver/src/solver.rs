//! The search plugged into a solver job.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use planwright_core::domain::PlanningSolution;
use planwright_core::Result;

use crate::scope::SolverScope;

/// A search over the working solution of a [`SolverScope`].
///
/// The job calls [`solve`](Self::solve) once on its own thread, after the
/// initial best solution has been published. The search is expected to:
/// - change the working solution only through moves or director hooks
/// - call [`SolverScope::update_best_solution`] when the working score improves
/// - call [`SolverScope::process_problem_changes`] between steps
/// - return once [`SolverScope::is_terminated`] reports true
pub trait Solver<S: PlanningSolution>: Send {
    fn solve(&mut self, solver_scope: &mut SolverScope<'_, S>) -> Result<()>;
}

impl<S: PlanningSolution> Solver<S> for Box<dyn Solver<S>> {
    fn solve(&mut self, solver_scope: &mut SolverScope<'_, S>) -> Result<()> {
        (**self).solve(solver_scope)
    }
}

/// A solver implemented as a closure.
///
/// # Example
///
/// ```
/// use planwright_solver::solver::{FnSolver, Solver};
/// use planwright_test::nqueens::NQueensSolution;
///
/// let solver = FnSolver::<NQueensSolution, _>::new(|scope| {
///     while !scope.is_terminated() {
///         scope.process_problem_changes()?;
///         scope.increment_step_count();
///         if scope.total_step_count() >= 10 {
///             break;
///         }
///     }
///     Ok(())
/// });
/// ```
pub struct FnSolver<S, F>
where
    S: PlanningSolution,
    F: FnMut(&mut SolverScope<'_, S>) -> Result<()> + Send,
{
    solve_fn: F,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, F> FnSolver<S, F>
where
    S: PlanningSolution,
    F: FnMut(&mut SolverScope<'_, S>) -> Result<()> + Send,
{
    pub fn new(solve_fn: F) -> Self {
        Self {
            solve_fn,
            _phantom: PhantomData,
        }
    }
}

impl<S, F> Solver<S> for FnSolver<S, F>
where
    S: PlanningSolution,
    F: FnMut(&mut SolverScope<'_, S>) -> Result<()> + Send,
{
    fn solve(&mut self, solver_scope: &mut SolverScope<'_, S>) -> Result<()> {
        (self.solve_fn)(solver_scope)
    }
}

impl<S, F> Debug for FnSolver<S, F>
where
    S: PlanningSolution,
    F: FnMut(&mut SolverScope<'_, S>) -> Result<()> + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSolver").finish_non_exhaustive()
    }
}
