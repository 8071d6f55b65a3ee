//! Constraint matches: one firing of a constraint with its justifications.

use std::collections::BTreeMap;
use std::fmt;

use planwright_core::score::Score;
use planwright_core::{ConstraintRef, ObjectHandle};

/// One instance of a constraint firing.
///
/// Justifications are the working objects that caused the match. Their order
/// is irrelevant for comparison: [`key`](Self::key) sorts them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintMatch<Sc> {
    pub constraint: ConstraintRef,
    pub justifications: Vec<ObjectHandle>,
    pub score: Sc,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    /// Creates a new constraint match.
    pub fn new(
        constraint: ConstraintRef,
        justifications: impl IntoIterator<Item = ObjectHandle>,
        score: Sc,
    ) -> Self {
        Self {
            constraint,
            justifications: justifications.into_iter().collect(),
            score,
        }
    }

    /// Identity of this match for multiset comparison.
    pub fn key(&self) -> ConstraintMatchKey<Sc> {
        let mut justifications = self.justifications.clone();
        justifications.sort();
        ConstraintMatchKey {
            constraint: self.constraint.clone(),
            justifications,
            score: self.score,
        }
    }
}

impl<Sc: Score> fmt::Display for ConstraintMatch<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key(), f)
    }
}

/// A constraint match reduced to `(constraint, sorted justifications, score)`.
///
/// Two matches with equal keys are interchangeable; constraint streams may
/// legitimately produce several of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintMatchKey<Sc> {
    pub constraint: ConstraintRef,
    pub justifications: Vec<ObjectHandle>,
    pub score: Sc,
}

impl<Sc: Score> fmt::Display for ConstraintMatchKey<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/[", self.constraint)?;
        for (i, justification) in self.justifications.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", justification)?;
        }
        write!(f, "]={}", self.score.to_short_string())
    }
}

/// All matches of one constraint with their summed score.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintMatchTotal<Sc> {
    pub constraint: ConstraintRef,
    pub matches: Vec<ConstraintMatch<Sc>>,
    pub score: Sc,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    /// Number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Groups matches per constraint, ordered by constraint.
    pub fn group(matches: &[ConstraintMatch<Sc>]) -> Vec<Self> {
        let mut totals: BTreeMap<&ConstraintRef, Self> = BTreeMap::new();
        for m in matches {
            let total = totals.entry(&m.constraint).or_insert_with(|| Self {
                constraint: m.constraint.clone(),
                matches: Vec::new(),
                score: Sc::zero(),
            });
            total.score = total.score + m.score;
            total.matches.push(m.clone());
        }
        totals.into_values().collect()
    }
}
