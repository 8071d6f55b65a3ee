//! Composite termination.

use std::fmt::{self, Debug};

use planwright_core::domain::PlanningSolution;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates when ANY child terminates.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use planwright_solver::termination::{
///     OrTermination, ScoreCalculationCountTermination, Termination, TimeSpentTermination,
/// };
/// use planwright_test::nqueens::NQueensSolution;
///
/// // Terminate after 30 seconds OR 10,000 score calculations
/// let termination = OrTermination::<NQueensSolution>::new(vec![
///     Box::new(TimeSpentTermination::from_secs(30)),
///     Box::new(ScoreCalculationCountTermination::<NQueensSolution>::new(10_000)),
/// ]);
/// assert_eq!(termination.len(), 2);
/// ```
pub struct OrTermination<S: PlanningSolution> {
    terminations: Vec<Box<dyn Termination<S>>>,
}

impl<S: PlanningSolution> OrTermination<S> {
    pub fn new(terminations: Vec<Box<dyn Termination<S>>>) -> Self {
        Self { terminations }
    }

    pub fn len(&self) -> usize {
        self.terminations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminations.is_empty()
    }
}

impl<S: PlanningSolution> Debug for OrTermination<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OrTermination").field(&self.terminations).finish()
    }
}

impl<S: PlanningSolution> Termination<S> for OrTermination<S> {
    fn is_terminated(&self, solver_scope: &SolverScope<'_, S>) -> bool {
        self.terminations
            .iter()
            .any(|termination| termination.is_terminated(solver_scope))
    }
}
