//! Variable listener infrastructure for shadow variable updates.
//!
//! Variable listeners are notified when their source variables change,
//! allowing them to update shadow variables accordingly.
//!
//! # Architecture
//!
//! - [`VariableListener`]: receives before/after notifications
//! - [`VariableListenerSupport`]: links one notifiable per listener in global
//!   shadow order, queues notifications and flushes them
//! - [`ListenerContext`]: what a listener sees while its notifications are
//!   flushed; shadow changes announced through it reach downstream listeners
//!   and the score calculator

mod context;
mod notifiable;
mod support;
mod traits;

#[cfg(test)]
mod tests;

pub use context::ListenerContext;
pub use support::VariableListenerSupport;
pub use traits::{Notification, NoopObserver, VariableChangeObserver, VariableListener};
