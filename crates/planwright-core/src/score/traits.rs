//! Core Score trait definition

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

/// Core trait for all score types.
///
/// Scores represent the quality of a planning solution. They are used to:
/// - Compare solutions (better/worse/equal)
/// - Detect score corruption by comparing incremental and from-scratch results
/// - Determine feasibility
///
/// All score implementations must be immutable, thread-safe and totally ordered.
///
/// # Init score
///
/// The init score is the negated count of genuine variable slots that have not
/// been assigned yet. It is compared before any level, so a less initialized
/// solution is always worse than a more initialized one.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Hash
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns the init score, `0` when the solution is fully initialized.
    fn init_score(&self) -> i32;

    /// Returns a copy of this score with the given init score.
    fn with_init_score(&self, init_score: i32) -> Self;

    /// Returns true when no genuine variable slot is unassigned.
    fn is_solution_initialized(&self) -> bool {
        self.init_score() >= 0
    }

    /// Returns true if this score represents a feasible solution.
    ///
    /// A solution is feasible when it is fully initialized and its hardest
    /// level is not negative.
    fn is_feasible(&self) -> bool;

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns the level values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Creates a score from an init score and level numbers.
    ///
    /// # Panics
    /// Panics if the number of levels doesn't match `levels_count()`.
    fn from_level_numbers(init_score: i32, levels: &[i64]) -> Self;

    /// Returns the label appended to the level at `index` in string forms.
    fn level_suffix(index: usize) -> &'static str;

    /// Renders only the non-zero parts of the score, `"0"` if there are none.
    ///
    /// Used in log messages and corruption reports where the full form is noisy.
    fn to_short_string(&self) -> String {
        let mut parts = Vec::new();
        if self.init_score() != 0 {
            parts.push(format!("{}init", self.init_score()));
        }
        for (index, level) in self.to_level_numbers().into_iter().enumerate() {
            if level != 0 {
                parts.push(format!("{}{}", level, Self::level_suffix(index)));
            }
        }
        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join("/")
        }
    }

    /// Compares two scores, returning the ordering.
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Returns true if this score is better than the other score.
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns true if this score is worse than the other score.
    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }
}
