//! Entity descriptor.

use std::fmt;

use super::VariableDescriptor;
use crate::domain::handle::PlanningIdValue;
use crate::domain::variable::VariableId;

/// Describes a planning entity type at runtime.
pub struct EntityDescriptor<S> {
    /// Name of the entity type.
    pub type_name: &'static str,
    descriptor_index: usize,
    entity_count: fn(&S) -> usize,
    planning_id: Option<fn(&S, usize) -> Option<PlanningIdValue>>,
    identity: Option<fn(&S, usize) -> usize>,
    variables: Vec<VariableDescriptor<S>>,
}

impl<S> EntityDescriptor<S> {
    /// Creates a new EntityDescriptor over the collection counted by `entity_count`.
    pub fn new(type_name: &'static str, entity_count: fn(&S) -> usize) -> Self {
        EntityDescriptor {
            type_name,
            descriptor_index: 0,
            entity_count,
            planning_id: None,
            identity: None,
            variables: Vec::new(),
        }
    }

    /// Sets the planning id accessor used by the working-object lookup.
    pub fn with_planning_id(mut self, accessor: fn(&S, usize) -> Option<PlanningIdValue>) -> Self {
        self.planning_id = Some(accessor);
        self
    }

    /// Sets the identity accessor: the address of the entity's storage.
    ///
    /// Enables the check that a planning clone shares no entity with the
    /// original.
    pub fn with_identity(mut self, accessor: fn(&S, usize) -> usize) -> Self {
        self.identity = Some(accessor);
        self
    }

    /// Adds a variable descriptor.
    pub fn with_variable(mut self, descriptor: VariableDescriptor<S>) -> Self {
        self.variables.push(descriptor);
        self
    }

    /// Index of this descriptor in its solution descriptor.
    pub fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    pub(crate) fn set_descriptor_index(&mut self, descriptor_index: usize) {
        self.descriptor_index = descriptor_index;
    }

    /// Returns the number of entities in the solution.
    pub fn entity_count(&self, solution: &S) -> usize {
        (self.entity_count)(solution)
    }

    /// Returns the planning id of the entity at `index`.
    ///
    /// The outer `Option` is `None` if the type declares no planning id.
    pub fn planning_id(&self, solution: &S, index: usize) -> Option<Option<PlanningIdValue>> {
        self.planning_id.map(|accessor| accessor(solution, index))
    }

    /// Returns true if this type declares a planning id.
    pub fn has_planning_id(&self) -> bool {
        self.planning_id.is_some()
    }

    /// Returns the storage address of the entity at `index`, if declared.
    pub fn identity(&self, solution: &S, index: usize) -> Option<usize> {
        self.identity.map(|accessor| accessor(solution, index))
    }

    /// All variable descriptors in declaration order.
    pub fn variables(&self) -> &[VariableDescriptor<S>] {
        &self.variables
    }

    pub(crate) fn variables_mut(&mut self) -> &mut [VariableDescriptor<S>] {
        &mut self.variables
    }

    /// Returns the variable at `variable_index`.
    pub fn variable(&self, variable_index: usize) -> Option<&VariableDescriptor<S>> {
        self.variables.get(variable_index)
    }

    /// Finds a variable's id by name.
    pub fn find_variable(&self, name: &str) -> Option<VariableId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(|variable_index| VariableId::new(self.descriptor_index, variable_index))
    }

    /// Returns genuine variables with their ids.
    pub fn genuine_variables(&self) -> impl Iterator<Item = (VariableId, &VariableDescriptor<S>)> {
        let descriptor_index = self.descriptor_index;
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_genuine())
            .map(move |(i, v)| (VariableId::new(descriptor_index, i), v))
    }

    /// Returns shadow variables with their ids.
    pub fn shadow_variables(&self) -> impl Iterator<Item = (VariableId, &VariableDescriptor<S>)> {
        let descriptor_index = self.descriptor_index;
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_shadow())
            .map(move |(i, v)| (VariableId::new(descriptor_index, i), v))
    }

    /// Returns true if this entity has any genuine variables.
    pub fn has_genuine_variables(&self) -> bool {
        self.variables.iter().any(|v| v.is_genuine())
    }

    /// Counts the unassigned basic variables of the entity at `index`.
    ///
    /// List slots are not attributed to an entity; they are counted per
    /// solution from the number of unplaced elements.
    pub fn count_uninitialized_variables(&self, solution: &S, index: usize) -> i32 {
        self.variables
            .iter()
            .filter(|v| v.is_uninitialized(solution, index))
            .count() as i32
    }
}

impl<S> fmt::Debug for EntityDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("descriptor_index", &self.descriptor_index)
            .field("has_planning_id", &self.planning_id.is_some())
            .field("variables", &self.variables)
            .finish()
    }
}
