//! Working-object lookup.
//!
//! Resolves externally supplied planning ids to the handles of the working
//! objects that carry them, so problem changes built against an older copy of
//! the solution can find their counterpart in the working solution.

use std::collections::HashMap;

use super::descriptor::SolutionDescriptor;
use super::handle::{EntityHandle, FactHandle, ObjectHandle, PlanningIdValue};
use crate::error::{PlanwrightError, Result};

/// Maps `(type name, planning id)` to working object handles.
#[derive(Debug, Default)]
pub struct WorkingObjectLookup {
    id_map: HashMap<&'static str, HashMap<PlanningIdValue, ObjectHandle>>,
}

impl WorkingObjectLookup {
    /// Creates an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every indexed object.
    pub fn reset(&mut self) {
        self.id_map.clear();
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.id_map.values().map(HashMap::len).sum()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexes a working object.
    ///
    /// # Errors
    ///
    /// Fails if another object of the same type already has this planning id.
    pub fn add(
        &mut self,
        type_name: &'static str,
        id: PlanningIdValue,
        handle: ObjectHandle,
    ) -> Result<()> {
        let by_id = self.id_map.entry(type_name).or_default();
        if let Some(existing) = by_id.get(&id) {
            return Err(PlanwrightError::DuplicatePlanningId {
                type_name,
                id,
                existing: handle_index(existing),
                duplicate: handle_index(&handle),
            });
        }
        by_id.insert(id, handle);
        Ok(())
    }

    /// Removes a working object from the index.
    ///
    /// # Errors
    ///
    /// Fails if the object was never added.
    pub fn remove(&mut self, type_name: &'static str, id: &PlanningIdValue) -> Result<ObjectHandle> {
        self.id_map
            .get_mut(type_name)
            .and_then(|by_id| by_id.remove(id))
            .ok_or_else(|| {
                PlanwrightError::InvalidState(format!(
                    "The working object of type ({}) with planning id ({}) was never added to the lookup.",
                    type_name, id
                ))
            })
    }

    /// Finds the working object with the given type and planning id.
    pub fn look_up(&self, type_name: &str, id: &PlanningIdValue) -> Option<ObjectHandle> {
        self.id_map.get(type_name)?.get(id).copied()
    }

    /// Like [`look_up`](Self::look_up) but fails if no working object matches.
    pub fn look_up_or_fail(&self, type_name: &str, id: &PlanningIdValue) -> Result<ObjectHandle> {
        self.look_up(type_name, id)
            .ok_or_else(|| PlanwrightError::UnknownWorkingObject {
                type_name: type_name.to_string(),
                id: id.clone(),
            })
    }

    /// Rebuilds the whole index from a working solution.
    ///
    /// Types without a planning id accessor are not indexed.
    ///
    /// # Errors
    ///
    /// Fails fast if an indexed object has no planning id or two objects of
    /// the same type share one.
    pub fn index_solution<S>(&mut self, descriptor: &SolutionDescriptor<S>, solution: &S) -> Result<()> {
        self.reset();
        for descriptor_index in 0..descriptor.problem_fact_descriptors().len() {
            self.index_facts(descriptor, solution, descriptor_index)?;
        }
        for descriptor_index in 0..descriptor.entity_descriptors().len() {
            self.index_entities(descriptor, solution, descriptor_index)?;
        }
        Ok(())
    }

    /// Drops and re-adds every entity of one descriptor.
    ///
    /// Handles are positions, so removing an entity shifts the handles of the
    /// entities behind it.
    pub fn reindex_entities<S>(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        descriptor_index: usize,
    ) -> Result<()> {
        if let Some(d) = descriptor.entity_descriptor(descriptor_index) {
            self.id_map.remove(d.type_name);
        }
        self.index_entities(descriptor, solution, descriptor_index)
    }

    /// Drops and re-adds every fact of one descriptor.
    pub fn reindex_facts<S>(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        descriptor_index: usize,
    ) -> Result<()> {
        if let Some(d) = descriptor.problem_fact_descriptor(descriptor_index) {
            self.id_map.remove(d.type_name);
        }
        self.index_facts(descriptor, solution, descriptor_index)
    }

    /// Indexes a single entity, if its type declares a planning id.
    pub fn add_entity<S>(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        entity: EntityHandle,
    ) -> Result<()> {
        let Some(d) = descriptor.entity_descriptor(entity.descriptor_index) else {
            return Ok(());
        };
        match d.planning_id(solution, entity.index) {
            None => Ok(()),
            Some(None) => Err(PlanwrightError::MissingPlanningId {
                type_name: d.type_name,
                index: entity.index,
            }),
            Some(Some(id)) => self.add(d.type_name, id, ObjectHandle::Entity(entity)),
        }
    }

    /// Indexes a single fact, if its type declares a planning id.
    pub fn add_fact<S>(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        fact: FactHandle,
    ) -> Result<()> {
        let Some(d) = descriptor.problem_fact_descriptor(fact.descriptor_index) else {
            return Ok(());
        };
        match d.planning_id(solution, fact.index) {
            None => Ok(()),
            Some(None) => Err(PlanwrightError::MissingPlanningId {
                type_name: d.type_name,
                index: fact.index,
            }),
            Some(Some(id)) => self.add(d.type_name, id, ObjectHandle::Fact(fact)),
        }
    }

    fn index_entities<S>(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        descriptor_index: usize,
    ) -> Result<()> {
        let count = descriptor
            .entity_descriptor(descriptor_index)
            .map_or(0, |d| d.entity_count(solution));
        for index in 0..count {
            self.add_entity(descriptor, solution, EntityHandle::new(descriptor_index, index))?;
        }
        Ok(())
    }

    fn index_facts<S>(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        descriptor_index: usize,
    ) -> Result<()> {
        let count = descriptor
            .problem_fact_descriptor(descriptor_index)
            .map_or(0, |d| d.fact_count(solution));
        for index in 0..count {
            self.add_fact(descriptor, solution, FactHandle::new(descriptor_index, index))?;
        }
        Ok(())
    }
}

fn handle_index(handle: &ObjectHandle) -> usize {
    match handle {
        ObjectHandle::Fact(fact) => fact.index,
        ObjectHandle::Entity(entity) => entity.index,
    }
}
