//! Domain model types for defining planning problems
//!
//! - `PlanningSolution`: The container for the complete problem and solution
//! - Handles: positional addresses of entities and problem facts
//! - Descriptors: runtime metadata, including the shadow variable graph
//! - Listener support: queued shadow variable recomputation
//! - `WorkingObjectLookup`: planning id to working object resolution

mod descriptor;
mod handle;
mod lookup;
mod traits;
mod variable;

pub mod listener;


pub use descriptor::{
    EntityDescriptor, ListenerFactory, ProblemFactDescriptor, ShadowVariableDescriptor,
    SolutionDescriptor, SolutionDescriptorBuilder, VariableDescriptor,
};
pub use handle::{EntityHandle, FactHandle, ObjectHandle, PlanningIdValue};
pub use listener::{
    ListenerContext, Notification, VariableChangeObserver, VariableListener,
    VariableListenerSupport,
};
pub use lookup::WorkingObjectLookup;
pub use traits::PlanningSolution;
pub use variable::{ShadowValue, VariableId, VariableType};
