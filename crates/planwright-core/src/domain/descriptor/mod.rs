//! Runtime metadata describing the structure of a planning solution.

mod entity;
mod problem_fact;
mod solution;
mod var_descriptor;


pub use entity::EntityDescriptor;
pub use problem_fact::ProblemFactDescriptor;
pub use solution::{SolutionDescriptor, SolutionDescriptorBuilder};
pub use var_descriptor::{ListenerFactory, ShadowVariableDescriptor, VariableDescriptor};
