//! Moves that put a value into a list variable or take it out of every list.

use std::fmt;

use planwright_core::domain::{EntityHandle, PlanningSolution, VariableId};

use super::Move;
use crate::director::ScoreDirector;

/// Typed access to one list variable.
pub struct ListVariableAccess<S> {
    pub variable: VariableId,
    pub len: fn(&S, usize) -> usize,
    pub element_at: fn(&S, usize, usize) -> usize,
    pub insert: fn(&mut S, usize, usize, usize),
    pub remove: fn(&mut S, usize, usize) -> usize,
}

impl<S> Clone for ListVariableAccess<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ListVariableAccess<S> {}

impl<S> fmt::Debug for ListVariableAccess<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListVariableAccess")
            .field("variable", &self.variable)
            .finish_non_exhaustive()
    }
}

/// Inserts an unassigned element at `position` of an entity's list.
///
/// Fires the list range hooks for `[position, position]` before and
/// `[position, position + 1)` after, plus the element assigned hooks.
pub struct ListAssignMove<S> {
    access: ListVariableAccess<S>,
    element: usize,
    entity_index: usize,
    position: usize,
}

impl<S> ListAssignMove<S> {
    pub fn new(access: ListVariableAccess<S>, element: usize, entity_index: usize, position: usize) -> Self {
        Self {
            access,
            element,
            entity_index,
            position,
        }
    }
}

impl<S> Clone for ListAssignMove<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ListAssignMove<S> {}

impl<S> fmt::Debug for ListAssignMove<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListAssignMove")
            .field("variable", &self.access.variable)
            .field("element", &self.element)
            .field("entity_index", &self.entity_index)
            .field("position", &self.position)
            .finish()
    }
}

impl<S: PlanningSolution> Move<S> for ListAssignMove<S> {
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        self.position <= (self.access.len)(score_director.working_solution(), self.entity_index)
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Box<dyn Move<S>> {
        let variable = self.access.variable;
        let entity = EntityHandle::new(variable.descriptor_index, self.entity_index);

        score_director.before_list_variable_element_assigned(variable, self.element);
        score_director.before_list_variable_changed(variable, entity, self.position, self.position);
        (self.access.insert)(
            score_director.working_solution_mut(),
            self.entity_index,
            self.position,
            self.element,
        );
        score_director.after_list_variable_changed(variable, entity, self.position, self.position + 1);
        score_director.after_list_variable_element_assigned(variable, self.element);

        Box::new(ListUnassignMove::new(self.access, self.entity_index, self.position))
    }
}

/// Takes the element at `position` of an entity's list out of every list.
pub struct ListUnassignMove<S> {
    access: ListVariableAccess<S>,
    entity_index: usize,
    position: usize,
}

impl<S> ListUnassignMove<S> {
    pub fn new(access: ListVariableAccess<S>, entity_index: usize, position: usize) -> Self {
        Self {
            access,
            entity_index,
            position,
        }
    }
}

impl<S> Clone for ListUnassignMove<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ListUnassignMove<S> {}

impl<S> fmt::Debug for ListUnassignMove<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListUnassignMove")
            .field("variable", &self.access.variable)
            .field("entity_index", &self.entity_index)
            .field("position", &self.position)
            .finish()
    }
}

impl<S: PlanningSolution> Move<S> for ListUnassignMove<S> {
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        self.position < (self.access.len)(score_director.working_solution(), self.entity_index)
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Box<dyn Move<S>> {
        let variable = self.access.variable;
        let entity = EntityHandle::new(variable.descriptor_index, self.entity_index);
        let element = (self.access.element_at)(
            score_director.working_solution(),
            self.entity_index,
            self.position,
        );

        score_director.before_list_variable_element_unassigned(variable, element);
        score_director.before_list_variable_changed(variable, entity, self.position, self.position + 1);
        (self.access.remove)(
            score_director.working_solution_mut(),
            self.entity_index,
            self.position,
        );
        score_director.after_list_variable_changed(variable, entity, self.position, self.position);
        score_director.after_list_variable_element_unassigned(variable, element);

        Box::new(ListAssignMove::new(
            self.access,
            element,
            self.entity_index,
            self.position,
        ))
    }
}
