//! Problem fact descriptor.

use std::fmt;

use crate::domain::handle::PlanningIdValue;

/// Describes a problem fact type at runtime.
pub struct ProblemFactDescriptor<S> {
    /// Name of the problem fact type.
    pub type_name: &'static str,
    fact_count: fn(&S) -> usize,
    planning_id: Option<fn(&S, usize) -> Option<PlanningIdValue>>,
}

impl<S> ProblemFactDescriptor<S> {
    /// Creates a new ProblemFactDescriptor over the collection counted by `fact_count`.
    pub fn new(type_name: &'static str, fact_count: fn(&S) -> usize) -> Self {
        ProblemFactDescriptor {
            type_name,
            fact_count,
            planning_id: None,
        }
    }

    /// Sets the planning id accessor used by the working-object lookup.
    pub fn with_planning_id(mut self, accessor: fn(&S, usize) -> Option<PlanningIdValue>) -> Self {
        self.planning_id = Some(accessor);
        self
    }

    /// Returns the number of facts of this type in the solution.
    pub fn fact_count(&self, solution: &S) -> usize {
        (self.fact_count)(solution)
    }

    /// Returns the planning id of the fact at `index`.
    ///
    /// The outer `Option` is `None` if the type declares no planning id.
    pub fn planning_id(&self, solution: &S, index: usize) -> Option<Option<PlanningIdValue>> {
        self.planning_id.map(|accessor| accessor(solution, index))
    }

    /// Returns true if this type declares a planning id.
    pub fn has_planning_id(&self) -> bool {
        self.planning_id.is_some()
    }
}

impl<S> fmt::Debug for ProblemFactDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemFactDescriptor")
            .field("type_name", &self.type_name)
            .field("has_planning_id", &self.planning_id.is_some())
            .finish()
    }
}
