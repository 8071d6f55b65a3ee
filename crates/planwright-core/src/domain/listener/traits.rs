//! Listener and observer traits.

use super::context::ListenerContext;
use crate::domain::handle::EntityHandle;
use crate::domain::variable::VariableId;

/// A listener that is notified when a source variable changes.
///
/// `before_*` callbacks run immediately, while the old state is still in
/// place. `after_*` callbacks are queued and run when the score director
/// triggers variable listeners, in global shadow order.
///
/// # Implementation Notes
///
/// - Only modify shadow variables for which this listener is configured
/// - Never modify genuine variables or problem facts
/// - Announce every shadow change through the [`ListenerContext`] so
///   downstream listeners and the score calculator see it
/// - A single listener can update shadow variables on multiple entities
///   (e.g., changing an arrival time affects all later visits in a route)
pub trait VariableListener<S>: Send {
    /// Called before an entity is added.
    fn before_entity_added(&mut self, _solution: &S, _entity: EntityHandle) {}

    /// Called after an entity was added. Defaults to a variable change.
    fn after_entity_added(&mut self, ctx: &mut ListenerContext<'_, S>, entity: EntityHandle) {
        self.after_variable_changed(ctx, entity);
    }

    /// Called before a source variable changes on the entity.
    ///
    /// Use this to capture any old state needed for shadow variable calculation.
    fn before_variable_changed(&mut self, _solution: &S, _entity: EntityHandle) {}

    /// Called after a source variable has changed on the entity.
    fn after_variable_changed(&mut self, ctx: &mut ListenerContext<'_, S>, entity: EntityHandle);

    /// Called before an entity is removed, while it is still reachable.
    fn before_entity_removed(&mut self, _solution: &S, _entity: EntityHandle) {}

    /// Called after an entity was removed. The handle names the vacated position.
    fn after_entity_removed(&mut self, _ctx: &mut ListenerContext<'_, S>, _entity: EntityHandle) {}

    /// Called before elements in `[from_index, to_index)` of a source list change.
    fn before_list_variable_changed(
        &mut self,
        _solution: &S,
        _entity: EntityHandle,
        _from_index: usize,
        _to_index: usize,
    ) {
    }

    /// Called after elements in `[from_index, to_index)` of a source list changed.
    ///
    /// Defaults to a variable change of the whole entity.
    fn after_list_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, S>,
        entity: EntityHandle,
        _from_index: usize,
        _to_index: usize,
    ) {
        self.after_variable_changed(ctx, entity);
    }

    /// Called after a value was taken out of every list.
    ///
    /// Reset the shadow variables describing the element's position.
    fn after_list_element_unassigned(&mut self, _ctx: &mut ListenerContext<'_, S>, _element: usize) {}

    /// Whether this listener requires unique entity events.
    ///
    /// When `true`, each kind of notification is delivered at most once per
    /// entity between two flushes.
    fn requires_unique_entity_events(&self) -> bool {
        false
    }

    /// Called when the working solution changes.
    fn reset_working_solution(&mut self, _solution: &S) {}

    /// Called when the listener is no longer needed.
    fn close(&mut self) {}
}

/// Receives shadow variable changes announced by listeners.
///
/// The score director routes these to its score calculator.
pub trait VariableChangeObserver<S> {
    fn before_variable_changed(&mut self, solution: &S, variable: VariableId, entity: EntityHandle);

    fn after_variable_changed(&mut self, solution: &S, variable: VariableId, entity: EntityHandle);
}

/// Observer that ignores every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl<S> VariableChangeObserver<S> for NoopObserver {
    fn before_variable_changed(&mut self, _: &S, _: VariableId, _: EntityHandle) {}

    fn after_variable_changed(&mut self, _: &S, _: VariableId, _: EntityHandle) {}
}

/// A queued listener event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// Entity was added to the working solution.
    EntityAdded(EntityHandle),
    /// A source variable on the entity changed.
    VariableChanged(EntityHandle),
    /// Entity was removed from the working solution.
    EntityRemoved(EntityHandle),
    /// Elements in a range of a source list changed.
    ListVariableChanged {
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    },
    /// A value was taken out of every list.
    ElementUnassigned(usize),
}

impl Notification {
    pub(crate) fn trigger_before<S>(&self, listener: &mut dyn VariableListener<S>, solution: &S) {
        match *self {
            Notification::EntityAdded(entity) => listener.before_entity_added(solution, entity),
            Notification::VariableChanged(entity) => {
                listener.before_variable_changed(solution, entity)
            }
            Notification::EntityRemoved(entity) => listener.before_entity_removed(solution, entity),
            Notification::ListVariableChanged {
                entity,
                from_index,
                to_index,
            } => listener.before_list_variable_changed(solution, entity, from_index, to_index),
            Notification::ElementUnassigned(_) => {}
        }
    }

    pub(crate) fn trigger_after<S>(
        &self,
        listener: &mut dyn VariableListener<S>,
        ctx: &mut ListenerContext<'_, S>,
    ) {
        match *self {
            Notification::EntityAdded(entity) => listener.after_entity_added(ctx, entity),
            Notification::VariableChanged(entity) => listener.after_variable_changed(ctx, entity),
            Notification::EntityRemoved(entity) => listener.after_entity_removed(ctx, entity),
            Notification::ListVariableChanged {
                entity,
                from_index,
                to_index,
            } => listener.after_list_variable_changed(ctx, entity, from_index, to_index),
            Notification::ElementUnassigned(element) => {
                listener.after_list_element_unassigned(ctx, element)
            }
        }
    }
}
