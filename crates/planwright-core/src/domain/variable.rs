//! Variable type definitions

use std::any::Any;
use std::fmt::{self, Debug};

/// The type of a planning variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// A genuine variable holding at most one value.
    Basic,
    /// A genuine variable holding an ordered list of values.
    List,
    /// A shadow variable computed from other variables by a listener.
    Shadow,
}

impl VariableType {
    /// Returns true for variables the search assigns directly.
    pub fn is_genuine(&self) -> bool {
        !matches!(self, VariableType::Shadow)
    }

    /// Returns true for shadow variables.
    pub fn is_shadow(&self) -> bool {
        matches!(self, VariableType::Shadow)
    }

    /// Returns true for list variables.
    pub fn is_list(&self) -> bool {
        matches!(self, VariableType::List)
    }
}

/// Address of a variable: the entity descriptor and the variable's position
/// in that descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId {
    pub descriptor_index: usize,
    pub variable_index: usize,
}

impl VariableId {
    /// Creates a new variable id.
    pub const fn new(descriptor_index: usize, variable_index: usize) -> Self {
        Self {
            descriptor_index,
            variable_index,
        }
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({}:{})", self.descriptor_index, self.variable_index)
    }
}

/// A snapshot of a shadow variable's value.
///
/// Implemented for every `PartialEq + Debug` type, so accessors simply box
/// the field value. Two snapshots are equal only if they hold the same type
/// and compare equal.
pub trait ShadowValue: Any + Debug + Send + Sync {
    /// Compares this snapshot with another one.
    fn eq_value(&self, other: &dyn ShadowValue) -> bool;

    /// Upcasts for downcasting in [`eq_value`](Self::eq_value).
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug + PartialEq + Send + Sync> ShadowValue for T {
    fn eq_value(&self, other: &dyn ShadowValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
