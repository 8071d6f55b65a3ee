//! Score calculators.
//!
//! A [`ScoreCalculator`] turns a working solution into a score. The score
//! director forwards every mutation hook to it, so incremental calculators
//! can keep their own state; full recalculators simply ignore the hooks.
//!
//! # Implementations
//!
//! - [`EasyScoreCalculator`] - a closure computing the score from scratch
//! - [`MatchingScoreCalculator`] - a closure producing constraint matches,
//!   which enables corruption analysis

mod easy;
mod matching;


pub use easy::EasyScoreCalculator;
pub use matching::MatchingScoreCalculator;

use planwright_core::domain::{EntityHandle, PlanningSolution, VariableId};

use crate::constraint_match::ConstraintMatch;

/// Computes the score of a working solution.
///
/// Calculators must leave the init score at zero: the score director owns
/// the init score and applies it after calculation.
pub trait ScoreCalculator<S: PlanningSolution>: Send {
    /// Starts over on a new working solution.
    fn reset_working_solution(&mut self, solution: &S, constraint_match_enabled: bool);

    /// Computes the score of the working solution.
    fn calculate_score(&mut self, solution: &S) -> S::Score;

    fn before_entity_added(&mut self, _solution: &S, _entity: EntityHandle) {}

    fn after_entity_added(&mut self, _solution: &S, _entity: EntityHandle) {}

    fn before_variable_changed(&mut self, _solution: &S, _variable: VariableId, _entity: EntityHandle) {}

    fn after_variable_changed(&mut self, _solution: &S, _variable: VariableId, _entity: EntityHandle) {}

    fn before_list_variable_changed(
        &mut self,
        _solution: &S,
        _variable: VariableId,
        _entity: EntityHandle,
        _from_index: usize,
        _to_index: usize,
    ) {
    }

    fn after_list_variable_changed(
        &mut self,
        _solution: &S,
        _variable: VariableId,
        _entity: EntityHandle,
        _from_index: usize,
        _to_index: usize,
    ) {
    }

    fn before_list_element_assigned(&mut self, _solution: &S, _variable: VariableId, _element: usize) {}

    fn after_list_element_assigned(&mut self, _solution: &S, _variable: VariableId, _element: usize) {}

    fn before_list_element_unassigned(&mut self, _solution: &S, _variable: VariableId, _element: usize) {}

    fn after_list_element_unassigned(&mut self, _solution: &S, _variable: VariableId, _element: usize) {}

    fn before_entity_removed(&mut self, _solution: &S, _entity: EntityHandle) {}

    fn after_entity_removed(&mut self, _solution: &S, _entity: EntityHandle) {}

    /// Whether the last reset asked for constraint matches and this
    /// calculator can produce them.
    fn is_constraint_match_enabled(&self) -> bool {
        false
    }

    /// Constraint matches of the last calculation.
    ///
    /// Returns `None` when constraint matching is disabled or unsupported.
    fn constraint_matches(&self) -> Option<&[ConstraintMatch<S::Score>]> {
        None
    }
}
