//! Positional handles for addressing working objects.
//!
//! Entities and problem facts are never referenced by pointer. A handle is the
//! pair of the descriptor index and the position within that descriptor's
//! collection, so equality of handles is identity of working objects.

use std::fmt;

/// Address of a planning entity in the working solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle {
    /// Index of the entity descriptor in the solution descriptor.
    pub descriptor_index: usize,
    /// Position of the entity in its collection.
    pub index: usize,
}

impl EntityHandle {
    /// Creates a new entity handle.
    pub const fn new(descriptor_index: usize, index: usize) -> Self {
        Self {
            descriptor_index,
            index,
        }
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}:{})", self.descriptor_index, self.index)
    }
}

/// Address of a problem fact in the working solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactHandle {
    /// Index of the problem fact descriptor in the solution descriptor.
    pub descriptor_index: usize,
    /// Position of the fact in its collection.
    pub index: usize,
}

impl FactHandle {
    /// Creates a new problem fact handle.
    pub const fn new(descriptor_index: usize, index: usize) -> Self {
        Self {
            descriptor_index,
            index,
        }
    }
}

impl fmt::Display for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fact({}:{})", self.descriptor_index, self.index)
    }
}

/// Either kind of working object.
///
/// The derived ordering sorts by class first (facts before entities), then by
/// descriptor and position. Constraint justifications are sorted with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectHandle {
    Fact(FactHandle),
    Entity(EntityHandle),
}

impl From<EntityHandle> for ObjectHandle {
    fn from(handle: EntityHandle) -> Self {
        ObjectHandle::Entity(handle)
    }
}

impl From<FactHandle> for ObjectHandle {
    fn from(handle: FactHandle) -> Self {
        ObjectHandle::Fact(handle)
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectHandle::Fact(handle) => handle.fmt(f),
            ObjectHandle::Entity(handle) => handle.fmt(f),
        }
    }
}

/// Value of a planning id, used to match external objects to working objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanningIdValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for PlanningIdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningIdValue::Int(value) => write!(f, "{}", value),
            PlanningIdValue::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for PlanningIdValue {
    fn from(value: i64) -> Self {
        PlanningIdValue::Int(value)
    }
}

impl From<usize> for PlanningIdValue {
    fn from(value: usize) -> Self {
        PlanningIdValue::Int(value as i64)
    }
}

impl From<&str> for PlanningIdValue {
    fn from(value: &str) -> Self {
        PlanningIdValue::Text(value.to_string())
    }
}

impl From<String> for PlanningIdValue {
    fn from(value: String) -> Self {
        PlanningIdValue::Text(value)
    }
}
