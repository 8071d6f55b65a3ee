//! Score calculation count termination.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use planwright_core::domain::PlanningSolution;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates once the score director has calculated a number of scores.
///
/// # Example
///
/// ```
/// use planwright_solver::termination::ScoreCalculationCountTermination;
/// use planwright_test::nqueens::NQueensSolution;
///
/// // Terminate after 10,000 score calculations
/// let termination = ScoreCalculationCountTermination::<NQueensSolution>::new(10_000);
/// assert_eq!(termination.limit(), 10_000);
/// ```
#[derive(Clone)]
pub struct ScoreCalculationCountTermination<S: PlanningSolution> {
    score_calculation_count_limit: u64,
    _phantom: PhantomData<fn() -> S>,
}

impl<S: PlanningSolution> Debug for ScoreCalculationCountTermination<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreCalculationCountTermination")
            .field("score_calculation_count_limit", &self.score_calculation_count_limit)
            .finish()
    }
}

impl<S: PlanningSolution> ScoreCalculationCountTermination<S> {
    pub fn new(score_calculation_count_limit: u64) -> Self {
        Self {
            score_calculation_count_limit,
            _phantom: PhantomData,
        }
    }

    pub fn limit(&self) -> u64 {
        self.score_calculation_count_limit
    }
}

impl<S: PlanningSolution> Termination<S> for ScoreCalculationCountTermination<S> {
    fn is_terminated(&self, solver_scope: &SolverScope<'_, S>) -> bool {
        solver_scope.calculation_count() >= self.score_calculation_count_limit
    }
}
