//! Move trait definition.

use std::fmt::Debug;

use planwright_core::domain::PlanningSolution;

use crate::director::ScoreDirector;

/// A move that modifies one or more planning variables.
///
/// # Implementation Notes
/// - Bracket every edit with the score director's before/after hooks
/// - The returned undo move must restore the working solution exactly,
///   shadow variables included once listeners are triggered
pub trait Move<S: PlanningSolution>: Send + Sync + Debug {
    /// Returns true if doing this move would change the working solution.
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool;

    /// Executes this move and returns the move that undoes it.
    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Box<dyn Move<S>>;

    /// Human readable form used in corruption reports.
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}
