//! Context handed to listeners while notifications are flushed.

use std::collections::HashMap;

use smallvec::SmallVec;

use super::notifiable::Notifiable;
use super::traits::{Notification, VariableChangeObserver};
use crate::domain::handle::EntityHandle;
use crate::domain::variable::VariableId;

/// Mutable access to the working solution for a listener's after callbacks.
///
/// Shadow changes must be bracketed by [`before_variable_changed`] and
/// [`after_variable_changed`] (or made through [`change_variable`]). The
/// change then reaches the score calculator and is queued on every listener
/// later in the global order that is sourced on the changed variable.
///
/// [`before_variable_changed`]: Self::before_variable_changed
/// [`after_variable_changed`]: Self::after_variable_changed
/// [`change_variable`]: Self::change_variable
pub struct ListenerContext<'a, S> {
    solution: &'a mut S,
    observer: &'a mut dyn VariableChangeObserver<S>,
    downstream: &'a mut [Notifiable<S>],
    offset: usize,
    source_variable_map: &'a HashMap<VariableId, SmallVec<[usize; 4]>>,
}

impl<'a, S> ListenerContext<'a, S> {
    pub(crate) fn new(
        solution: &'a mut S,
        observer: &'a mut dyn VariableChangeObserver<S>,
        downstream: &'a mut [Notifiable<S>],
        offset: usize,
        source_variable_map: &'a HashMap<VariableId, SmallVec<[usize; 4]>>,
    ) -> Self {
        Self {
            solution,
            observer,
            downstream,
            offset,
            source_variable_map,
        }
    }

    /// The working solution.
    pub fn solution(&self) -> &S {
        &*self.solution
    }

    /// The working solution, mutably. Bracket shadow edits with the change hooks.
    pub fn solution_mut(&mut self) -> &mut S {
        &mut *self.solution
    }

    /// Announces that a shadow variable of `entity` is about to change.
    pub fn before_variable_changed(&mut self, variable: VariableId, entity: EntityHandle) {
        self.observer
            .before_variable_changed(&*self.solution, variable, entity);
        let offset = self.offset;
        if let Some(positions) = self.source_variable_map.get(&variable) {
            // Listeners at or before the current one already ran in this flush.
            for &position in positions.iter().filter(|&&p| p >= offset) {
                self.downstream[position - offset]
                    .notify_before(Notification::VariableChanged(entity), &*self.solution);
            }
        }
    }

    /// Announces that a shadow variable of `entity` has changed.
    pub fn after_variable_changed(&mut self, variable: VariableId, entity: EntityHandle) {
        self.observer
            .after_variable_changed(&*self.solution, variable, entity);
    }

    /// Brackets `update` with the before and after hooks.
    pub fn change_variable<F>(&mut self, variable: VariableId, entity: EntityHandle, update: F)
    where
        F: FnOnce(&mut S),
    {
        self.before_variable_changed(variable, entity);
        update(&mut *self.solution);
        self.after_variable_changed(variable, entity);
    }
}
