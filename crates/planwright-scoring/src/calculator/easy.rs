//! Full recalculation from a closure.

use std::fmt;

use planwright_core::domain::PlanningSolution;

use super::ScoreCalculator;

/// Recalculates the whole score on every call.
///
/// The closure is stored as a concrete type parameter.
///
/// # Example
///
/// ```
/// use planwright_core::score::SimpleScore;
/// use planwright_scoring::{EasyScoreCalculator, ScoreCalculator};
/// use planwright_test::nqueens::{calculate_conflicts, NQueensSolution};
///
/// let mut calculator = EasyScoreCalculator::new(calculate_conflicts);
/// let solution = NQueensSolution::with_rows(&[0, 0]);
/// calculator.reset_working_solution(&solution, false);
/// assert_eq!(calculator.calculate_score(&solution), SimpleScore::of(-1));
/// ```
pub struct EasyScoreCalculator<F> {
    calculator: F,
}

impl<F> EasyScoreCalculator<F> {
    pub fn new(calculator: F) -> Self {
        Self { calculator }
    }
}

impl<S, F> ScoreCalculator<S> for EasyScoreCalculator<F>
where
    S: PlanningSolution,
    F: Fn(&S) -> S::Score + Send,
{
    fn reset_working_solution(&mut self, _solution: &S, _constraint_match_enabled: bool) {}

    fn calculate_score(&mut self, solution: &S) -> S::Score {
        (self.calculator)(solution)
    }
}

impl<F> fmt::Debug for EasyScoreCalculator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasyScoreCalculator").finish_non_exhaustive()
    }
}
