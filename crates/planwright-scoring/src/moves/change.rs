//! ChangeMove - assigns a value to a basic planning variable.

use std::fmt::{self, Debug};

use planwright_core::domain::{EntityHandle, PlanningSolution, VariableId};

use super::Move;
use crate::director::ScoreDirector;

/// A move that assigns a value to an entity's variable.
///
/// Stores typed function pointers; the undo move is another `ChangeMove`
/// carrying the old value.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `V` - The variable value type
pub struct ChangeMove<S, V> {
    variable: VariableId,
    entity_index: usize,
    to_value: Option<V>,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
}

impl<S, V: Clone> Clone for ChangeMove<S, V> {
    fn clone(&self) -> Self {
        Self {
            variable: self.variable,
            entity_index: self.entity_index,
            to_value: self.to_value.clone(),
            getter: self.getter,
            setter: self.setter,
        }
    }
}

impl<S, V: Debug> Debug for ChangeMove<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeMove")
            .field("variable", &self.variable)
            .field("entity_index", &self.entity_index)
            .field("to_value", &self.to_value)
            .finish()
    }
}

impl<S, V> ChangeMove<S, V> {
    /// Creates a new change move.
    ///
    /// # Arguments
    /// * `variable` - The basic variable to change
    /// * `entity_index` - Index of the entity in its collection
    /// * `to_value` - The value to assign (None to unassign)
    /// * `getter` - Reads the current value from the solution
    /// * `setter` - Writes a value to the solution
    pub fn new(
        variable: VariableId,
        entity_index: usize,
        to_value: Option<V>,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
    ) -> Self {
        Self {
            variable,
            entity_index,
            to_value,
            getter,
            setter,
        }
    }

    pub fn entity(&self) -> EntityHandle {
        EntityHandle::new(self.variable.descriptor_index, self.entity_index)
    }

    pub fn to_value(&self) -> Option<&V> {
        self.to_value.as_ref()
    }
}

impl<S, V> Move<S> for ChangeMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        let current = (self.getter)(score_director.working_solution(), self.entity_index);
        current != self.to_value
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Box<dyn Move<S>> {
        let old_value = (self.getter)(score_director.working_solution(), self.entity_index);
        let entity = self.entity();

        score_director.before_variable_changed(self.variable, entity);
        (self.setter)(
            score_director.working_solution_mut(),
            self.entity_index,
            self.to_value.clone(),
        );
        score_director.after_variable_changed(self.variable, entity);

        Box::new(ChangeMove::new(
            self.variable,
            self.entity_index,
            old_value,
            self.getter,
            self.setter,
        ))
    }

    fn describe(&self) -> String {
        format!(
            "{} {{{} -> {:?}}}",
            self.variable, self.entity_index, self.to_value
        )
    }
}
