//! Full recalculation through constraint matches.

use std::fmt;

use planwright_core::domain::PlanningSolution;
use planwright_core::score::Score;

use super::ScoreCalculator;
use crate::constraint_match::ConstraintMatch;

/// Recalculates every constraint match and sums their scores.
///
/// When constraint matching is enabled the matches of the last calculation
/// are kept, which makes this calculator a good uncorrupted reference for
/// score corruption analysis.
pub struct MatchingScoreCalculator<S: PlanningSolution, F> {
    matcher: F,
    constraint_match_enabled: bool,
    matches: Vec<ConstraintMatch<S::Score>>,
}

impl<S, F> MatchingScoreCalculator<S, F>
where
    S: PlanningSolution,
    F: Fn(&S) -> Vec<ConstraintMatch<S::Score>> + Send,
{
    pub fn new(matcher: F) -> Self {
        Self {
            matcher,
            constraint_match_enabled: false,
            matches: Vec::new(),
        }
    }
}

impl<S, F> ScoreCalculator<S> for MatchingScoreCalculator<S, F>
where
    S: PlanningSolution,
    F: Fn(&S) -> Vec<ConstraintMatch<S::Score>> + Send,
{
    fn reset_working_solution(&mut self, _solution: &S, constraint_match_enabled: bool) {
        self.constraint_match_enabled = constraint_match_enabled;
        self.matches.clear();
    }

    fn calculate_score(&mut self, solution: &S) -> S::Score {
        let matches = (self.matcher)(solution);
        let score = matches
            .iter()
            .fold(S::Score::zero(), |total, m| total + m.score);
        if self.constraint_match_enabled {
            self.matches = matches;
        }
        score
    }

    fn is_constraint_match_enabled(&self) -> bool {
        self.constraint_match_enabled
    }

    fn constraint_matches(&self) -> Option<&[ConstraintMatch<S::Score>]> {
        self.constraint_match_enabled.then_some(self.matches.as_slice())
    }
}

impl<S: PlanningSolution, F> fmt::Debug for MatchingScoreCalculator<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchingScoreCalculator")
            .field("constraint_match_enabled", &self.constraint_match_enabled)
            .field("match_count", &self.matches.len())
            .finish()
    }
}
