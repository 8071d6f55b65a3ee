// Score director trait definition.

use planwright_core::domain::{
    EntityHandle, FactHandle, ObjectHandle, PlanningIdValue, PlanningSolution, SolutionDescriptor,
    VariableId,
};
use planwright_core::Result;

// The score director owns the working solution and keeps its score honest.
//
// Every edit of the working solution must be bracketed by the matching
// before/after hooks, so that:
// - The init score stays equal to a from-scratch count
// - Shadow variable listeners are queued for the changed sources
// - The score calculator sees every change
// - The working-object lookup keeps resolving planning ids
//
// Moves and problem changes only see this trait, so it stays object safe.
pub trait ScoreDirector<S: PlanningSolution>: Send {
    // Returns a reference to the working solution.
    fn working_solution(&self) -> &S;

    // Returns a mutable reference to the working solution.
    //
    // Edits made through it must be bracketed by the mutation hooks.
    fn working_solution_mut(&mut self) -> &mut S;

    // Returns the solution descriptor for this solution type.
    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;

    // Flushes queued listener notifications, then calculates the score and
    // stores it on the working solution.
    fn calculate_score(&mut self) -> Result<S::Score>;

    // Flushes queued listener notifications without calculating a score.
    fn trigger_variable_listeners(&mut self);

    fn before_entity_added(&mut self, entity: EntityHandle);

    fn after_entity_added(&mut self, entity: EntityHandle) -> Result<()>;

    fn before_variable_changed(&mut self, variable: VariableId, entity: EntityHandle);

    fn after_variable_changed(&mut self, variable: VariableId, entity: EntityHandle);

    // Called before the elements in `[from_index, to_index)` of a list change.
    //
    // The range may be wider than the change, never narrower. Elements that
    // enter or leave every list also need the element hooks.
    fn before_list_variable_changed(
        &mut self,
        variable: VariableId,
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    );

    fn after_list_variable_changed(
        &mut self,
        variable: VariableId,
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    );

    fn before_list_variable_element_assigned(&mut self, variable: VariableId, element: usize);

    fn after_list_variable_element_assigned(&mut self, variable: VariableId, element: usize);

    fn before_list_variable_element_unassigned(&mut self, variable: VariableId, element: usize);

    fn after_list_variable_element_unassigned(&mut self, variable: VariableId, element: usize);

    // Called while the entity is still at its position.
    fn before_entity_removed(&mut self, entity: EntityHandle) -> Result<()>;

    // Called after the entity was taken out; `entity` names the vacated position.
    fn after_entity_removed(&mut self, entity: EntityHandle) -> Result<()>;

    fn before_problem_fact_added(&mut self, fact: FactHandle);

    fn after_problem_fact_added(&mut self, fact: FactHandle) -> Result<()>;

    fn before_problem_property_changed(&mut self, object: ObjectHandle);

    // Resets every listener and the score calculator.
    fn after_problem_property_changed(&mut self, object: ObjectHandle) -> Result<()>;

    fn before_problem_fact_removed(&mut self, fact: FactHandle) -> Result<()>;

    fn after_problem_fact_removed(&mut self, fact: FactHandle) -> Result<()>;

    // Resolves a planning id to the working object that carries it.
    //
    // Fails if lookup is disabled or no working object has the id.
    fn look_up_working_object(&self, type_name: &str, id: &PlanningIdValue) -> Result<ObjectHandle>;

    // Like `look_up_working_object` but returns `None` for unknown ids.
    fn look_up_working_object_or_none(
        &self,
        type_name: &str,
        id: &PlanningIdValue,
    ) -> Result<Option<ObjectHandle>>;

    // Negative number of uninitialized genuine variable slots.
    fn working_init_score(&self) -> i32;

    // Number of score calculations since the last reset of the counter.
    fn calculation_count(&self) -> u64;

    // Fails if a fact or entity of a type with planning ids has none.
    fn assert_non_null_planning_ids(&self) -> Result<()>;

    // Brackets `update` with the variable change hooks.
    fn change_variable(
        &mut self,
        variable: VariableId,
        entity: EntityHandle,
        update: &mut dyn FnMut(&mut S),
    ) {
        self.before_variable_changed(variable, entity);
        update(self.working_solution_mut());
        self.after_variable_changed(variable, entity);
    }
}
