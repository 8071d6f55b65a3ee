//! Wall-clock limit on solving.

use std::time::Duration;

use planwright_core::domain::PlanningSolution;

use super::Termination;
use crate::scope::SolverScope;

/// Stops the search once `spent_limit` has passed since `start_solving`.
///
/// A scope that has not started solving has spent no time, so it is never
/// terminated by this limit.
///
/// ```
/// use std::time::Duration;
/// use planwright_solver::termination::TimeSpentTermination;
///
/// let limit = TimeSpentTermination::from_millis(1_500);
/// assert_eq!(limit.spent_limit(), Duration::from_millis(1_500));
/// assert_eq!(TimeSpentTermination::from_secs(2).spent_limit(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpentTermination {
    spent_limit: Duration,
}

impl TimeSpentTermination {
    pub fn new(spent_limit: Duration) -> Self {
        Self { spent_limit }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn spent_limit(&self) -> Duration {
        self.spent_limit
    }

    /// Time left before the limit, or `None` if solving has not started.
    pub fn time_left<S: PlanningSolution>(&self, solver_scope: &SolverScope<'_, S>) -> Option<Duration> {
        solver_scope
            .elapsed()
            .map(|spent| self.spent_limit.saturating_sub(spent))
    }
}

impl<S: PlanningSolution> Termination<S> for TimeSpentTermination {
    fn is_terminated(&self, solver_scope: &SolverScope<'_, S>) -> bool {
        self.time_left(solver_scope) == Some(Duration::ZERO)
    }
}
