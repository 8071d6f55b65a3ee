//! Notification support for shadow variable listeners.

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::context::ListenerContext;
use super::notifiable::Notifiable;
use super::traits::{Notification, VariableChangeObserver};
use crate::domain::descriptor::SolutionDescriptor;
use crate::domain::handle::EntityHandle;
use crate::domain::variable::VariableId;
use crate::error::{PlanwrightError, Result};

/// Routes mutation hooks to the shadow variable listeners that depend on them.
///
/// One notifiable is linked per shadow variable that declares a listener,
/// ordered by the variable's global order. Before hooks run the listener's
/// before callback immediately and queue the matching after callback;
/// [`trigger_variable_listeners_in_notification_queues`] drains the queues in
/// global order.
///
/// [`trigger_variable_listeners_in_notification_queues`]: Self::trigger_variable_listeners_in_notification_queues
pub struct VariableListenerSupport<S> {
    notifiables: Vec<Notifiable<S>>,
    source_variable_map: HashMap<VariableId, SmallVec<[usize; 4]>>,
    source_entity_map: Vec<SmallVec<[usize; 4]>>,
    notification_queues_are_empty: bool,
    closed: bool,
}

impl<S> VariableListenerSupport<S> {
    /// Builds a fresh listener for every shadow variable of `descriptor`.
    pub fn link(descriptor: &SolutionDescriptor<S>) -> Self {
        let mut notifiables = Vec::new();
        let mut source_variable_map: HashMap<VariableId, SmallVec<[usize; 4]>> = HashMap::new();
        let mut source_entity_map: Vec<SmallVec<[usize; 4]>> =
            vec![SmallVec::new(); descriptor.entity_descriptors().len()];

        for &variable in descriptor.shadow_variables_in_global_order() {
            let Some(shadow) = descriptor.variable(variable).and_then(|v| v.as_shadow()) else {
                continue;
            };
            let Some(factory) = shadow.listener_factory() else {
                continue;
            };
            let position = notifiables.len();
            let listener = (factory.as_ref())();
            notifiables.push(Notifiable::new(variable, shadow.global_order(), listener));
            for source in shadow.sources() {
                source_variable_map.entry(*source).or_default().push(position);
                let by_entity = &mut source_entity_map[source.descriptor_index];
                if !by_entity.contains(&position) {
                    by_entity.push(position);
                }
            }
        }

        debug!(
            event = "listeners_linked",
            solution = descriptor.type_name,
            listener_count = notifiables.len(),
        );

        Self {
            notifiables,
            source_variable_map,
            source_entity_map,
            notification_queues_are_empty: true,
            closed: false,
        }
    }

    /// Number of linked listeners.
    pub fn listener_count(&self) -> usize {
        self.notifiables.len()
    }

    /// Drops all queued notifications and resets every listener.
    pub fn reset_working_solution(&mut self, solution: &S) {
        for notifiable in &mut self.notifiables {
            notifiable.clear();
            notifiable.listener.reset_working_solution(solution);
        }
        self.notification_queues_are_empty = true;
        self.closed = false;
    }

    /// Closes every listener. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for notifiable in &mut self.notifiables {
            notifiable.clear();
            notifiable.listener.close();
        }
        self.notification_queues_are_empty = true;
    }

    pub fn before_entity_added(&mut self, solution: &S, entity: EntityHandle) {
        self.notify_entity(solution, entity, Notification::EntityAdded(entity));
    }

    pub fn before_entity_removed(&mut self, solution: &S, entity: EntityHandle) {
        self.notify_entity(solution, entity, Notification::EntityRemoved(entity));
    }

    pub fn before_variable_changed(&mut self, solution: &S, variable: VariableId, entity: EntityHandle) {
        if let Some(positions) = self.source_variable_map.get(&variable) {
            for &position in positions {
                self.notifiables[position]
                    .notify_before(Notification::VariableChanged(entity), solution);
            }
            self.notification_queues_are_empty = false;
        }
    }

    pub fn before_list_variable_changed(
        &mut self,
        solution: &S,
        variable: VariableId,
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    ) {
        if let Some(positions) = self.source_variable_map.get(&variable) {
            for &position in positions {
                self.notifiables[position]
                    .listener
                    .before_list_variable_changed(solution, entity, from_index, to_index);
            }
        }
    }

    pub fn after_list_variable_changed(
        &mut self,
        variable: VariableId,
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    ) {
        if let Some(positions) = self.source_variable_map.get(&variable) {
            for &position in positions {
                self.notifiables[position].notify_after(Notification::ListVariableChanged {
                    entity,
                    from_index,
                    to_index,
                });
            }
            self.notification_queues_are_empty = false;
        }
    }

    pub fn after_list_element_unassigned(&mut self, variable: VariableId, element: usize) {
        if let Some(positions) = self.source_variable_map.get(&variable) {
            for &position in positions {
                self.notifiables[position].notify_after(Notification::ElementUnassigned(element));
            }
            self.notification_queues_are_empty = false;
        }
    }

    /// Returns true if some listener still has queued notifications.
    pub fn has_pending_notifications(&self) -> bool {
        self.notifiables.iter().any(Notifiable::has_pending)
    }

    /// Fails if any listener still has queued notifications.
    pub fn assert_notification_queues_are_empty(&self) -> Result<()> {
        if !self.notification_queues_are_empty || self.has_pending_notifications() {
            return Err(PlanwrightError::InvalidState(
                "The notification queues might not be empty (notificationQueuesAreEmpty is false). \
                 Maybe a mutation hook was called without triggering the variable listeners afterwards."
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Runs every queued after callback, listener by listener in global order.
    ///
    /// Shadow changes announced by a listener are queued on later listeners
    /// and therefore processed in the same pass.
    pub fn trigger_variable_listeners_in_notification_queues(
        &mut self,
        solution: &mut S,
        observer: &mut dyn VariableChangeObserver<S>,
    ) {
        let source_variable_map = &self.source_variable_map;
        let notifiables = &mut self.notifiables;
        for position in 0..notifiables.len() {
            let (head, downstream) = notifiables.split_at_mut(position + 1);
            let notifiable = &mut head[position];
            let queue = notifiable.take_queue();
            if queue.is_empty() {
                continue;
            }
            trace!(
                event = "listener_flush",
                variable = %notifiable.variable,
                global_order = notifiable.global_order,
                notification_count = queue.len(),
            );
            let mut ctx = ListenerContext::new(
                &mut *solution,
                &mut *observer,
                downstream,
                position + 1,
                source_variable_map,
            );
            for notification in queue {
                notification.trigger_after(&mut *notifiable.listener, &mut ctx);
            }
        }
        self.notification_queues_are_empty = true;
    }

    /// Simulates a no-op change of every genuine variable of every entity and
    /// flushes, so every listener recomputes every shadow value.
    pub fn force_trigger_all_variable_listeners(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &mut S,
        observer: &mut dyn VariableChangeObserver<S>,
    ) {
        for entity in descriptor.entity_handles(solution) {
            let Some(entity_descriptor) = descriptor.entity_descriptor(entity.descriptor_index) else {
                continue;
            };
            for (variable, variable_descriptor) in entity_descriptor.genuine_variables() {
                if variable_descriptor.is_list() {
                    let len = variable_descriptor.list_len(solution, entity.index);
                    self.before_list_variable_changed(solution, variable, entity, 0, len);
                    self.after_list_variable_changed(variable, entity, 0, len);
                } else {
                    self.before_variable_changed(solution, variable, entity);
                }
            }
        }
        self.trigger_variable_listeners_in_notification_queues(solution, observer);
    }

    fn notify_entity(&mut self, solution: &S, entity: EntityHandle, notification: Notification) {
        let Some(positions) = self.source_entity_map.get(entity.descriptor_index) else {
            return;
        };
        for &position in positions {
            self.notifiables[position].notify_before(notification, solution);
        }
        if !positions.is_empty() {
            self.notification_queues_are_empty = false;
        }
    }
}

impl<S> Drop for VariableListenerSupport<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S> fmt::Debug for VariableListenerSupport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variables: Vec<VariableId> = self.notifiables.iter().map(|n| n.variable).collect();
        f.debug_struct("VariableListenerSupport")
            .field("listeners", &variables)
            .field("notification_queues_are_empty", &self.notification_queues_are_empty)
            .field("closed", &self.closed)
            .finish()
    }
}
