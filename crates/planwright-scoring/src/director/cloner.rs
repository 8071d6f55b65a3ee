//! Planning clones of solutions.

use std::fmt;

use planwright_core::domain::PlanningSolution;

/// Produces a planning clone of a solution.
///
/// Mutating the clone's entities must never affect the original's. Problem
/// facts may be shared.
pub trait SolutionCloner<S>: Send + Sync {
    fn clone_solution(&self, original: &S) -> S;
}

/// Clones through the solution's `Clone` implementation.
#[derive(Default, Clone, Copy)]
pub struct CloneSolutionCloner;

impl<S: PlanningSolution> SolutionCloner<S> for CloneSolutionCloner {
    fn clone_solution(&self, original: &S) -> S {
        original.clone()
    }
}

impl fmt::Debug for CloneSolutionCloner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CloneSolutionCloner")
    }
}

impl<S, F> SolutionCloner<S> for F
where
    F: Fn(&S) -> S + Send + Sync,
{
    fn clone_solution(&self, original: &S) -> S {
        self(original)
    }
}
