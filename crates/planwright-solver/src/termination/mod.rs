//! Termination conditions consulted by the search.

mod composite;
mod external;
mod score_calculation_count;
mod time;

use std::fmt::Debug;

use planwright_config::TerminationConfig;
use planwright_core::domain::PlanningSolution;

use crate::scope::SolverScope;

pub use composite::OrTermination;
pub use external::ExternalTermination;
pub use score_calculation_count::ScoreCalculationCountTermination;
pub use time::TimeSpentTermination;

/// Trait for determining when to stop solving.
pub trait Termination<S: PlanningSolution>: Send + Debug {
    /// Returns true if solving should terminate.
    fn is_terminated(&self, solver_scope: &SolverScope<'_, S>) -> bool;
}

/// Builds the termination described by `config`, if it sets any limit.
///
/// Several limits combine with OR: the first one reached stops the search.
pub fn build_termination<S: PlanningSolution>(
    config: &TerminationConfig,
) -> Option<Box<dyn Termination<S>>> {
    let mut terminations: Vec<Box<dyn Termination<S>>> = Vec::new();
    if let Some(limit) = config.time_limit() {
        terminations.push(Box::new(TimeSpentTermination::new(limit)));
    }
    if let Some(limit) = config.score_calculation_count_limit {
        terminations.push(Box::new(ScoreCalculationCountTermination::<S>::new(limit)));
    }
    match terminations.len() {
        0 => None,
        1 => terminations.pop(),
        _ => Some(Box::new(OrTermination::new(terminations))),
    }
}
