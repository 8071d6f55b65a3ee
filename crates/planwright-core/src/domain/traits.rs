//! The solution trait implemented by user problem types.

use crate::score::Score;

/// A problem together with its current assignment and score.
///
/// Planwright never looks inside a solution through this trait. Entities,
/// facts and variables are reached through the
/// [`SolutionDescriptor`](super::SolutionDescriptor) registered for the type;
/// the trait only carries the score slot.
///
/// Cloning must produce a planning clone: a best solution handed to a
/// consumer is a clone that lives on after the working solution changes, and
/// it crosses from the solver thread to the consumer thread.
///
/// ```
/// use planwright_core::{PlanningSolution, score::HardSoftScore};
///
/// #[derive(Clone)]
/// struct Timetable {
///     lessons: Vec<Option<usize>>,
///     score: Option<HardSoftScore>,
/// }
///
/// impl PlanningSolution for Timetable {
///     type Score = HardSoftScore;
///
///     fn score(&self) -> Option<HardSoftScore> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<HardSoftScore>) {
///         self.score = score;
///     }
/// }
///
/// let mut timetable = Timetable { lessons: vec![None, Some(2)], score: None };
/// timetable.set_score(Some(HardSoftScore::of(0, -4)));
/// assert_eq!(timetable.score(), Some(HardSoftScore::of(0, -4)));
/// ```
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    type Score: Score;

    /// The last score stored by a score director, `None` until scored.
    fn score(&self) -> Option<Self::Score>;

    fn set_score(&mut self, score: Option<Self::Score>);
}
