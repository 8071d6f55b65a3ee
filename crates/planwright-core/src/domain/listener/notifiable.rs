//! One listener together with its notification queue.

use std::collections::HashSet;

use super::traits::{Notification, VariableListener};
use crate::domain::variable::VariableId;

pub(crate) struct Notifiable<S> {
    pub(crate) variable: VariableId,
    pub(crate) global_order: usize,
    pub(crate) listener: Box<dyn VariableListener<S>>,
    queue: Vec<Notification>,
    // Only filled when the listener requires unique entity events.
    queued: HashSet<Notification>,
    unique: bool,
}

impl<S> Notifiable<S> {
    pub(crate) fn new(
        variable: VariableId,
        global_order: usize,
        listener: Box<dyn VariableListener<S>>,
    ) -> Self {
        let unique = listener.requires_unique_entity_events();
        Self {
            variable,
            global_order,
            listener,
            queue: Vec::new(),
            queued: HashSet::new(),
            unique,
        }
    }

    /// Runs the before callback now and queues the after callback.
    pub(crate) fn notify_before(&mut self, notification: Notification, solution: &S) {
        if self.enqueue(notification) {
            notification.trigger_before(&mut *self.listener, solution);
        }
    }

    /// Queues an after callback without a before callback.
    pub(crate) fn notify_after(&mut self, notification: Notification) {
        self.enqueue(notification);
    }

    pub(crate) fn take_queue(&mut self) -> Vec<Notification> {
        self.queued.clear();
        std::mem::take(&mut self.queue)
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.queued.clear();
    }

    fn enqueue(&mut self, notification: Notification) -> bool {
        if self.unique && !self.queued.insert(notification) {
            return false;
        }
        self.queue.push(notification);
        true
    }
}
