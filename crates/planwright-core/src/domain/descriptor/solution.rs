//! Solution descriptor.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::{EntityDescriptor, ProblemFactDescriptor, VariableDescriptor};
use crate::domain::handle::{EntityHandle, FactHandle};
use crate::domain::variable::VariableId;
use crate::error::{PlanwrightError, Result};

/// Describes a planning solution at runtime.
///
/// Contains metadata about:
/// - Entity types and their variables
/// - Problem fact types
/// - The global order of shadow variables
///
/// Built once through [`SolutionDescriptor::builder`]; building resolves
/// shadow sources and derives the dependency-respecting global order.
pub struct SolutionDescriptor<S> {
    /// Name of the solution type.
    pub type_name: &'static str,
    entity_descriptors: Vec<EntityDescriptor<S>>,
    problem_fact_descriptors: Vec<ProblemFactDescriptor<S>>,
    shadow_order: Vec<VariableId>,
}

impl<S> SolutionDescriptor<S> {
    /// Starts describing a solution type.
    pub fn builder(type_name: &'static str) -> SolutionDescriptorBuilder<S> {
        SolutionDescriptorBuilder {
            type_name,
            entity_descriptors: Vec::new(),
            problem_fact_descriptors: Vec::new(),
        }
    }

    /// All entity descriptors, indexed by descriptor index.
    pub fn entity_descriptors(&self) -> &[EntityDescriptor<S>] {
        &self.entity_descriptors
    }

    /// Returns the entity descriptor at `descriptor_index`.
    pub fn entity_descriptor(&self, descriptor_index: usize) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors.get(descriptor_index)
    }

    /// Finds an entity descriptor by type name.
    pub fn find_entity_descriptor(&self, type_name: &str) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors
            .iter()
            .find(|d| d.type_name == type_name)
    }

    /// All problem fact descriptors, indexed by descriptor index.
    pub fn problem_fact_descriptors(&self) -> &[ProblemFactDescriptor<S>] {
        &self.problem_fact_descriptors
    }

    /// Returns the problem fact descriptor at `descriptor_index`.
    pub fn problem_fact_descriptor(
        &self,
        descriptor_index: usize,
    ) -> Option<&ProblemFactDescriptor<S>> {
        self.problem_fact_descriptors.get(descriptor_index)
    }

    /// Returns the variable descriptor addressed by `variable`.
    pub fn variable(&self, variable: VariableId) -> Option<&VariableDescriptor<S>> {
        self.entity_descriptors
            .get(variable.descriptor_index)?
            .variable(variable.variable_index)
    }

    /// Resolves a variable by entity type name and variable name.
    pub fn variable_id(&self, entity_type: &str, variable_name: &str) -> Option<VariableId> {
        self.find_entity_descriptor(entity_type)?
            .find_variable(variable_name)
    }

    /// Like [`variable_id`](Self::variable_id) but fails with a configuration error.
    pub fn find_variable_or_fail(&self, entity_type: &str, variable_name: &str) -> Result<VariableId> {
        self.variable_id(entity_type, variable_name).ok_or_else(|| {
            PlanwrightError::Config(format!(
                "The solution ({}) has no variable ({}) on entity type ({}).",
                self.type_name, variable_name, entity_type
            ))
        })
    }

    /// Shadow variables sorted by global order.
    pub fn shadow_variables_in_global_order(&self) -> &[VariableId] {
        &self.shadow_order
    }

    /// Total number of entities across all entity types.
    pub fn entity_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.entity_count(solution))
            .sum()
    }

    /// Handles of every entity, grouped by descriptor in declaration order.
    pub fn entity_handles(&self, solution: &S) -> Vec<EntityHandle> {
        self.entity_descriptors
            .iter()
            .enumerate()
            .flat_map(|(descriptor_index, d)| {
                (0..d.entity_count(solution)).map(move |i| EntityHandle::new(descriptor_index, i))
            })
            .collect()
    }

    /// Handles of every problem fact, grouped by descriptor in declaration order.
    pub fn fact_handles(&self, solution: &S) -> Vec<FactHandle> {
        self.problem_fact_descriptors
            .iter()
            .enumerate()
            .flat_map(|(descriptor_index, d)| {
                (0..d.fact_count(solution)).map(move |i| FactHandle::new(descriptor_index, i))
            })
            .collect()
    }

    /// Counts every uninitialized genuine variable slot from scratch.
    ///
    /// Basic variables count once per unassigned, non-nullable slot. List
    /// variables count every value not placed in any entity's list, unless
    /// unassigned values are allowed.
    pub fn count_uninitialized(&self, solution: &S) -> i32 {
        let mut count = 0i32;
        for d in &self.entity_descriptors {
            let entity_count = d.entity_count(solution);
            for variable in d.variables() {
                if variable.is_list() {
                    if variable.allows_unassigned() {
                        continue;
                    }
                    let assigned: usize = (0..entity_count)
                        .map(|i| variable.list_len(solution, i))
                        .sum();
                    count += variable.element_count(solution) as i32 - assigned as i32;
                } else if variable.is_genuine() {
                    count += (0..entity_count)
                        .filter(|&i| variable.is_uninitialized(solution, i))
                        .count() as i32;
                }
            }
        }
        count
    }

    /// Counts the unassigned basic variables of a single entity.
    pub fn count_uninitialized_variables(&self, solution: &S, entity: EntityHandle) -> i32 {
        self.entity_descriptors
            .get(entity.descriptor_index)
            .map_or(0, |d| d.count_uninitialized_variables(solution, entity.index))
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("type_name", &self.type_name)
            .field("entity_descriptors", &self.entity_descriptors)
            .field("problem_fact_descriptors", &self.problem_fact_descriptors)
            .field("shadow_order", &self.shadow_order)
            .finish()
    }
}

/// Collects entity and fact descriptors before the shadow graph is resolved.
pub struct SolutionDescriptorBuilder<S> {
    type_name: &'static str,
    entity_descriptors: Vec<EntityDescriptor<S>>,
    problem_fact_descriptors: Vec<ProblemFactDescriptor<S>>,
}

impl<S> SolutionDescriptorBuilder<S> {
    /// Adds an entity descriptor.
    pub fn with_entity(mut self, descriptor: EntityDescriptor<S>) -> Self {
        self.entity_descriptors.push(descriptor);
        self
    }

    /// Adds a problem fact descriptor.
    pub fn with_problem_fact(mut self, descriptor: ProblemFactDescriptor<S>) -> Self {
        self.problem_fact_descriptors.push(descriptor);
        self
    }

    /// Resolves shadow sources and assigns the global shadow order.
    ///
    /// # Errors
    ///
    /// Fails if a shadow source names an unknown variable or if the shadow
    /// variables depend on each other in a cycle.
    pub fn build(self) -> Result<SolutionDescriptor<S>> {
        let SolutionDescriptorBuilder {
            type_name,
            mut entity_descriptors,
            problem_fact_descriptors,
        } = self;

        for (descriptor_index, d) in entity_descriptors.iter_mut().enumerate() {
            d.set_descriptor_index(descriptor_index);
        }

        let names: HashMap<(&'static str, &'static str), VariableId> = entity_descriptors
            .iter()
            .flat_map(|d| {
                d.variables().iter().enumerate().map(move |(i, v)| {
                    ((d.type_name, v.name), VariableId::new(d.descriptor_index(), i))
                })
            })
            .collect();

        let mut shadows: Vec<VariableId> = Vec::new();
        for d in entity_descriptors.iter_mut() {
            let descriptor_index = d.descriptor_index();
            let entity_type = d.type_name;
            for (variable_index, variable) in d.variables_mut().iter_mut().enumerate() {
                let variable_name = variable.name;
                let Some(shadow) = variable.as_shadow_mut() else {
                    continue;
                };
                let mut sources = Vec::with_capacity(shadow.declared_sources().len());
                for &(source_entity, source_variable) in shadow.declared_sources() {
                    let source = names.get(&(source_entity, source_variable)).ok_or_else(|| {
                        PlanwrightError::Config(format!(
                            "The shadow variable ({}.{}) has a source ({}.{}) that does not exist.",
                            entity_type, variable_name, source_entity, source_variable
                        ))
                    })?;
                    sources.push(*source);
                }
                shadow.set_sources(sources);
                shadows.push(VariableId::new(descriptor_index, variable_index));
            }
        }

        let shadow_order = order_shadow_variables(type_name, &entity_descriptors, &shadows)?;
        for (global_order, id) in shadow_order.iter().enumerate() {
            if let Some(shadow) = entity_descriptors[id.descriptor_index].variables_mut()
                [id.variable_index]
                .as_shadow_mut()
            {
                shadow.set_global_order(global_order);
            }
        }

        Ok(SolutionDescriptor {
            type_name,
            entity_descriptors,
            problem_fact_descriptors,
            shadow_order,
        })
    }
}

// Kahn's algorithm over shadow-to-shadow source edges. Ties are broken by
// declaration position so the order is stable across runs.
fn order_shadow_variables<S>(
    type_name: &'static str,
    entity_descriptors: &[EntityDescriptor<S>],
    shadows: &[VariableId],
) -> Result<Vec<VariableId>> {
    let position: HashMap<VariableId, usize> =
        shadows.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut in_degree = vec![0usize; shadows.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); shadows.len()];

    for (i, id) in shadows.iter().enumerate() {
        let sources = entity_descriptors[id.descriptor_index].variables()[id.variable_index]
            .as_shadow()
            .map(|s| s.sources())
            .unwrap_or_default();
        for source in sources {
            if let Some(&source_position) = position.get(source) {
                in_degree[i] += 1;
                dependents[source_position].push(i);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..shadows.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(shadows.len());
    while let Some(next) = ready.pop_first() {
        order.push(shadows[next]);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < shadows.len() {
        let cyclic: Vec<String> = (0..shadows.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| {
                let id = shadows[i];
                let d = &entity_descriptors[id.descriptor_index];
                format!("{}.{}", d.type_name, d.variables()[id.variable_index].name)
            })
            .collect();
        return Err(PlanwrightError::Config(format!(
            "The solution ({}) has shadow variables with cyclic sources: [{}].",
            type_name,
            cyclic.join(", ")
        )));
    }
    Ok(order)
}
