//! The default score director.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use planwright_core::domain::{
    EntityHandle, FactHandle, ObjectHandle, PlanningIdValue, PlanningSolution, SolutionDescriptor,
    VariableChangeObserver, VariableId, VariableListenerSupport, WorkingObjectLookup,
};
use planwright_core::score::Score;
use planwright_core::{PlanwrightError, Result};
use tracing::{debug, trace};

use super::analysis::{self, ShadowSnapshot};
use super::factory::ScoreDirectorFactory;
use super::traits::ScoreDirector;
use crate::calculator::ScoreCalculator;
use crate::constraint_match::ConstraintMatchTotal;
use crate::moves::Move;

/// Score director that forwards every mutation to a [`ScoreCalculator`].
///
/// Keeps the init score incrementally, queues shadow variable listeners,
/// maintains the working-object lookup and runs the corruption diagnostics
/// of the asserted environment modes.
pub struct DefaultScoreDirector<S: PlanningSolution> {
    factory: ScoreDirectorFactory<S>,
    descriptor: Arc<SolutionDescriptor<S>>,
    calculator: Box<dyn ScoreCalculator<S>>,
    listener_support: VariableListenerSupport<S>,
    working_solution: S,
    working_init_score: i32,
    working_entity_list_revision: u64,
    all_changes_will_be_undone_before_step_ends: bool,
    calculation_count: u64,
    lookup: Option<WorkingObjectLookup>,
    constraint_match_enabled_preference: bool,
    closed: bool,
}

impl<S: PlanningSolution> DefaultScoreDirector<S> {
    pub(crate) fn new(
        factory: ScoreDirectorFactory<S>,
        solution: S,
        lookup_enabled: bool,
        constraint_match_enabled: bool,
    ) -> Result<Self> {
        let descriptor = Arc::clone(factory.solution_descriptor());
        let lookup = if lookup_enabled {
            let mut lookup = WorkingObjectLookup::new();
            lookup.index_solution(&descriptor, &solution)?;
            Some(lookup)
        } else {
            None
        };
        let calculator = factory.create_calculator();
        let listener_support = VariableListenerSupport::link(&descriptor);
        let mut director = Self {
            factory,
            descriptor,
            calculator,
            listener_support,
            working_solution: solution,
            working_init_score: 0,
            working_entity_list_revision: 0,
            all_changes_will_be_undone_before_step_ends: false,
            calculation_count: 0,
            lookup,
            constraint_match_enabled_preference: constraint_match_enabled,
            closed: false,
        };
        director.reset_working_state(false);
        Ok(director)
    }

    /// Replaces the working solution and returns the previous one.
    ///
    /// Recounts the init score, re-indexes the lookup, links fresh listeners
    /// and resets the score calculator.
    ///
    /// # Errors
    ///
    /// Fails if lookup is enabled and a planning id is missing or
    /// duplicated. The director keeps its previous working solution then.
    pub fn set_working_solution(&mut self, solution: S) -> Result<S> {
        if self.lookup.is_some() {
            let mut lookup = WorkingObjectLookup::new();
            lookup.index_solution(&self.descriptor, &solution)?;
            self.lookup = Some(lookup);
        }
        let previous = std::mem::replace(&mut self.working_solution, solution);
        self.reset_working_state(true);
        Ok(previous)
    }

    fn reset_working_state(&mut self, relink: bool) {
        self.working_init_score = -self.descriptor.count_uninitialized(&self.working_solution);
        if relink {
            self.listener_support = VariableListenerSupport::link(&self.descriptor);
        }
        self.listener_support
            .reset_working_solution(&self.working_solution);
        self.calculator.reset_working_solution(
            &self.working_solution,
            self.constraint_match_enabled_preference,
        );
        self.working_entity_list_revision += 1;
        self.closed = false;
        debug!(
            event = "working_solution_set",
            solution = self.descriptor.type_name,
            init_score = self.working_init_score,
            entity_count = self.descriptor.entity_count(&self.working_solution),
            lookup_enabled = self.lookup.is_some(),
            constraint_match_enabled = self.is_constraint_match_enabled(),
        );
    }

    /// Closes the director and hands out the working solution.
    pub fn take_working_solution(mut self) -> S {
        self.close();
        let Self {
            working_solution, ..
        } = self;
        working_solution
    }

    /// Closes every listener and drops the lookup. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.listener_support.close();
        if let Some(lookup) = &mut self.lookup {
            lookup.reset();
        }
        debug!(
            event = "score_director_closed",
            solution = self.descriptor.type_name,
            calculation_count = self.calculation_count,
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn factory(&self) -> &ScoreDirectorFactory<S> {
        &self.factory
    }

    pub fn is_lookup_enabled(&self) -> bool {
        self.lookup.is_some()
    }

    /// Whether the calculator tracks constraint matches.
    pub fn is_constraint_match_enabled(&self) -> bool {
        self.calculator.is_constraint_match_enabled()
    }

    /// Constraint matches of the last calculation, grouped per constraint.
    ///
    /// # Errors
    ///
    /// Fails if constraint matching is disabled.
    pub fn constraint_match_totals(&self) -> Result<Vec<ConstraintMatchTotal<S::Score>>> {
        let matches = self.calculator.constraint_matches().ok_or_else(|| {
            PlanwrightError::InvalidState(
                "When constraintMatchEnabled is disabled, this method should not be called.\n\
                 Maybe enable constraint matches on the score director."
                    .to_string(),
            )
        })?;
        Ok(ConstraintMatchTotal::group(matches))
    }

    pub fn working_entity_list_revision(&self) -> u64 {
        self.working_entity_list_revision
    }

    /// Returns true if entities were added or removed since `expected_revision`.
    pub fn is_working_entity_list_dirty(&self, expected_revision: u64) -> bool {
        self.working_entity_list_revision != expected_revision
    }

    /// While set, adding or removing entities does not bump the revision.
    pub fn set_all_changes_will_be_undone_before_step_ends(&mut self, undone: bool) {
        self.all_changes_will_be_undone_before_step_ends = undone;
    }

    pub fn reset_calculation_count(&mut self) {
        self.calculation_count = 0;
    }

    /// Does the move, calculates the score and undoes the move.
    ///
    /// Returns the score of the moved state. The working solution is back in
    /// its previous state afterwards, with listener notifications pending.
    pub fn do_and_process_move(
        &mut self,
        move_: &dyn Move<S>,
        assert_move_score_from_scratch: bool,
    ) -> Result<S::Score> {
        let undo_move = move_.do_move(self);
        let score = self.calculate_score()?;
        if assert_move_score_from_scratch {
            self.assert_working_score_from_scratch(score, &move_.describe())?;
        }
        undo_move.do_move(self);
        Ok(score)
    }

    /// Planning clone of the working solution.
    pub fn clone_working_solution(&self) -> Result<S> {
        self.clone_solution(&self.working_solution)
    }

    /// Planning clone of `original` through the configured cloner.
    ///
    /// # Errors
    ///
    /// When cloned solutions are asserted, fails if the clone's score differs
    /// or if the clone shares an entity instance with the original.
    pub fn clone_solution(&self, original: &S) -> Result<S> {
        let clone = self.factory.solution_cloner().clone_solution(original);
        if self.factory.is_assert_cloned_solution() {
            self.assert_cloned_solution(original, &clone)?;
        }
        Ok(clone)
    }

    fn assert_cloned_solution(&self, original: &S, clone: &S) -> Result<()> {
        if original.score() != clone.score() {
            return Err(PlanwrightError::CloningCorruption(format!(
                "the cloneScore ({:?}) is not the originalScore ({:?}).\n\
                 Maybe the solution cloner does not clone the score.",
                clone.score(),
                original.score()
            )));
        }
        for entity_descriptor in self.descriptor.entity_descriptors() {
            let count = entity_descriptor.entity_count(original);
            let originals: HashSet<usize> = (0..count)
                .filter_map(|i| entity_descriptor.identity(original, i))
                .collect();
            for index in 0..entity_descriptor.entity_count(clone) {
                let Some(identity) = entity_descriptor.identity(clone, index) else {
                    continue;
                };
                if originals.contains(&identity) {
                    return Err(PlanwrightError::CloningCorruption(format!(
                        "the cloned entity ({}[{}]) is the same instance as an original entity.\n\
                         Maybe the solution cloner shares the entity collection of the original.",
                        entity_descriptor.type_name, index
                    )));
                }
            }
        }
        Ok(())
    }

    /// Fails unless a fresh director calculates the same score.
    pub fn assert_working_score_from_scratch(
        &mut self,
        working_score: S::Score,
        completed_action: &str,
    ) -> Result<()> {
        self.assert_score_from_scratch(working_score, completed_action, false)
    }

    /// Like [`assert_working_score_from_scratch`](Self::assert_working_score_from_scratch)
    /// for a score predicted without calculating it.
    pub fn assert_predicted_score_from_scratch(
        &mut self,
        predicted_score: S::Score,
        completed_action: &str,
    ) -> Result<()> {
        self.assert_score_from_scratch(predicted_score, completed_action, true)
    }

    fn assert_score_from_scratch(
        &mut self,
        score: S::Score,
        completed_action: &str,
        predicted: bool,
    ) -> Result<()> {
        let assertion_factory = self.factory.assertion_factory().unwrap_or(&self.factory);
        let solution = self.factory.solution_cloner().clone_solution(&self.working_solution);
        let mut uncorrupted = assertion_factory.build_score_director_with(solution, false, true)?;
        let uncorrupted_score = uncorrupted.calculate_score()?;
        if score == uncorrupted_score {
            return Ok(());
        }

        let score_analysis = analysis::score_corruption_analysis(
            self.calculator.constraint_matches(),
            uncorrupted.calculator.constraint_matches(),
            predicted,
        );
        let violations = self.shadow_variable_violations();
        let shadow_analysis = analysis::shadow_variable_analysis(violations.as_deref(), predicted);
        Err(PlanwrightError::ScoreCorruption(format!(
            "Score corruption ({}): the {} ({}) is not the uncorruptedScore ({}) after completedAction ({}):\n{}\n{}",
            (score - uncorrupted_score).to_short_string(),
            if predicted { "predictedScore" } else { "workingScore" },
            score,
            uncorrupted_score,
            completed_action,
            score_analysis,
            shadow_analysis
        )))
    }

    /// Force triggers every listener and lists the shadow values that changed.
    ///
    /// Leaves the shadow variables repaired.
    fn shadow_variable_violations(&mut self) -> Option<String> {
        let descriptor = Arc::clone(&self.descriptor);
        let corrupted = ShadowSnapshot::take(&descriptor, &self.working_solution);
        let mut observer = CalculatorObserver {
            calculator: &mut *self.calculator,
        };
        self.listener_support.force_trigger_all_variable_listeners(
            &descriptor,
            &mut self.working_solution,
            &mut observer,
        );
        let uncorrupted = ShadowSnapshot::take(&descriptor, &self.working_solution);
        corrupted.violations(&uncorrupted, &descriptor)
    }

    /// Fails unless calculating the score yields `expected_working_score`.
    pub fn assert_expected_working_score(
        &mut self,
        expected_working_score: S::Score,
        completed_action: &str,
    ) -> Result<()> {
        let working_score = self.calculate_score()?;
        if working_score != expected_working_score {
            return Err(PlanwrightError::ScoreCorruption(format!(
                "Score corruption ({}): the expectedWorkingScore ({}) is not the workingScore ({}) \
                 after completedAction ({}).",
                (expected_working_score - working_score).to_short_string(),
                expected_working_score,
                working_score,
                completed_action
            )));
        }
        Ok(())
    }

    /// Forces every listener to recompute every shadow variable and fails if
    /// any value changes.
    pub fn assert_shadow_variables_are_not_stale(
        &mut self,
        expected_working_score: S::Score,
        completed_action: &str,
    ) -> Result<()> {
        if let Some(violations) = self.shadow_variable_violations() {
            return Err(PlanwrightError::ShadowVariableCorruption(
                analysis::stale_shadow_report(&violations, completed_action),
            ));
        }

        let working_score = self.calculate_score()?;
        if working_score != expected_working_score {
            // A plain calculator bug is reported as such.
            self.assert_working_score_from_scratch(
                working_score,
                &format!(
                    "assert_shadow_variables_are_not_stale({}, {})",
                    expected_working_score, completed_action
                ),
            )?;
            return Err(PlanwrightError::ShadowVariableCorruption(format!(
                "Impossible VariableListener corruption ({}): the expectedWorkingScore ({}) is not the \
                 workingScore ({}) after all VariableListeners were triggered without changes to the \
                 genuine variables after completedAction ({}).\n\
                 But all the shadow variable values are still the same, so this is impossible.\n\
                 Maybe run an asserted environment mode to detect a corrupted score calculator.",
                (expected_working_score - working_score).to_short_string(),
                expected_working_score,
                working_score,
                completed_action
            )));
        }
        Ok(())
    }

    /// Fails unless the score after `undo_move` equals `before_move_score`.
    ///
    /// On a mismatch the from-scratch and staleness assertions run first, so
    /// a corrupted calculator or listener is reported as such.
    pub fn assert_expected_undo_move_score(
        &mut self,
        move_: &dyn Move<S>,
        undo_move: &dyn Move<S>,
        before_move_score: S::Score,
    ) -> Result<()> {
        let undo_score = self.calculate_score()?;
        if undo_score == before_move_score {
            return Ok(());
        }
        trace!(
            event = "undo_move_score_mismatch",
            before_move_score = %before_move_score,
            undo_score = %undo_score,
        );
        let completed_action = format!("Undo move ({}) of move ({})", undo_move.describe(), move_.describe());
        self.assert_working_score_from_scratch(undo_score, &completed_action)?;
        self.assert_shadow_variables_are_not_stale(undo_score, &completed_action)?;

        Err(PlanwrightError::UndoMoveCorruption(format!(
            "UndoMove corruption ({}): the beforeMoveScore ({}) is not the undoScore ({}) which is the \
             uncorruptedScore ({}) of the workingSolution.\n  \
             1) Enable an asserted environment mode (if you haven't already) to fail-faster in case \
             there's a score corruption or variable listener corruption.\n  \
             2) Check the do_move(...) method of the move ({}).\n     \
             It might return a corrupted undo move ({}).\n  \
             3) Check your custom variable listeners (if you have any) for shadow variables that are \
             used by score constraints that could cause the scoreDifference ({}).",
            (before_move_score - undo_score).to_short_string(),
            before_move_score,
            undo_score,
            undo_score,
            move_.describe(),
            undo_move.describe(),
            (before_move_score - undo_score).to_short_string()
        )))
    }

    /// Fails if a fact or entity of a type with planning ids has none.
    pub fn assert_non_null_planning_ids(&self) -> Result<()> {
        for d in self.descriptor.problem_fact_descriptors() {
            for index in 0..d.fact_count(&self.working_solution) {
                if let Some(None) = d.planning_id(&self.working_solution, index) {
                    return Err(PlanwrightError::MissingPlanningId {
                        type_name: d.type_name,
                        index,
                    });
                }
            }
        }
        for d in self.descriptor.entity_descriptors() {
            for index in 0..d.entity_count(&self.working_solution) {
                if let Some(None) = d.planning_id(&self.working_solution, index) {
                    return Err(PlanwrightError::MissingPlanningId {
                        type_name: d.type_name,
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    fn bump_entity_list_revision(&mut self) {
        if !self.all_changes_will_be_undone_before_step_ends {
            self.working_entity_list_revision += 1;
        }
    }

    // Structural fact changes invalidate listener and calculator state.
    fn reset_listeners_and_calculator(&mut self) {
        self.trigger_variable_listeners();
        self.listener_support
            .reset_working_solution(&self.working_solution);
        self.calculator.reset_working_solution(
            &self.working_solution,
            self.constraint_match_enabled_preference,
        );
    }

    // Unassigned list elements only count when the list must hold them all.
    fn counts_unassigned_elements(&self, variable: VariableId) -> bool {
        self.descriptor
            .variable(variable)
            .is_some_and(|v| v.is_list() && !v.allows_unassigned())
    }

    fn remove_from_lookup(&mut self, handle: ObjectHandle) -> Result<()> {
        let Some(lookup) = &mut self.lookup else {
            return Ok(());
        };
        let (type_name, id) = match handle {
            ObjectHandle::Entity(entity) => {
                let Some(d) = self.descriptor.entity_descriptor(entity.descriptor_index) else {
                    return Ok(());
                };
                (d.type_name, d.planning_id(&self.working_solution, entity.index))
            }
            ObjectHandle::Fact(fact) => {
                let Some(d) = self.descriptor.problem_fact_descriptor(fact.descriptor_index) else {
                    return Ok(());
                };
                (d.type_name, d.planning_id(&self.working_solution, fact.index))
            }
        };
        match id {
            None => Ok(()),
            Some(None) => Err(PlanwrightError::MissingPlanningId {
                type_name,
                index: match handle {
                    ObjectHandle::Entity(entity) => entity.index,
                    ObjectHandle::Fact(fact) => fact.index,
                },
            }),
            Some(Some(id)) => lookup.remove(type_name, &id).map(|_| ()),
        }
    }
}

impl<S: PlanningSolution> ScoreDirector<S> for DefaultScoreDirector<S> {
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.working_solution
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.descriptor
    }

    fn calculate_score(&mut self) -> Result<S::Score> {
        self.trigger_variable_listeners();
        let score = self.calculator.calculate_score(&self.working_solution);
        if score.init_score() != 0 {
            return Err(PlanwrightError::CalculatorInitScore(score.to_string()));
        }
        let score = score.with_init_score(self.working_init_score);
        self.working_solution.set_score(Some(score));
        self.calculation_count += 1;
        trace!(
            event = "score_calculated",
            score = %score,
            calculation_count = self.calculation_count,
        );
        Ok(score)
    }

    fn trigger_variable_listeners(&mut self) {
        let mut observer = CalculatorObserver {
            calculator: &mut *self.calculator,
        };
        self.listener_support
            .trigger_variable_listeners_in_notification_queues(&mut self.working_solution, &mut observer);
    }

    fn before_entity_added(&mut self, entity: EntityHandle) {
        self.listener_support
            .before_entity_added(&self.working_solution, entity);
        self.calculator
            .before_entity_added(&self.working_solution, entity);
    }

    fn after_entity_added(&mut self, entity: EntityHandle) -> Result<()> {
        self.working_init_score -= self
            .descriptor
            .count_uninitialized_variables(&self.working_solution, entity);
        if let Some(lookup) = &mut self.lookup {
            lookup.add_entity(&self.descriptor, &self.working_solution, entity)?;
        }
        self.calculator
            .after_entity_added(&self.working_solution, entity);
        self.bump_entity_list_revision();
        Ok(())
    }

    fn before_variable_changed(&mut self, variable: VariableId, entity: EntityHandle) {
        if let Some(variable_descriptor) = self.descriptor.variable(variable) {
            if variable_descriptor.is_list() {
                if !variable_descriptor.allows_unassigned() {
                    self.working_init_score -=
                        variable_descriptor.list_len(&self.working_solution, entity.index) as i32;
                }
            } else if variable_descriptor.is_uninitialized(&self.working_solution, entity.index) {
                self.working_init_score += 1;
            }
        }
        self.listener_support
            .before_variable_changed(&self.working_solution, variable, entity);
        self.calculator
            .before_variable_changed(&self.working_solution, variable, entity);
    }

    fn after_variable_changed(&mut self, variable: VariableId, entity: EntityHandle) {
        if let Some(variable_descriptor) = self.descriptor.variable(variable) {
            if variable_descriptor.is_list() {
                if !variable_descriptor.allows_unassigned() {
                    self.working_init_score +=
                        variable_descriptor.list_len(&self.working_solution, entity.index) as i32;
                }
            } else if variable_descriptor.is_uninitialized(&self.working_solution, entity.index) {
                self.working_init_score -= 1;
            }
        }
        self.calculator
            .after_variable_changed(&self.working_solution, variable, entity);
    }

    fn before_list_variable_changed(
        &mut self,
        variable: VariableId,
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    ) {
        self.listener_support.before_list_variable_changed(
            &self.working_solution,
            variable,
            entity,
            from_index,
            to_index,
        );
        self.calculator.before_list_variable_changed(
            &self.working_solution,
            variable,
            entity,
            from_index,
            to_index,
        );
    }

    fn after_list_variable_changed(
        &mut self,
        variable: VariableId,
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    ) {
        self.listener_support
            .after_list_variable_changed(variable, entity, from_index, to_index);
        self.calculator.after_list_variable_changed(
            &self.working_solution,
            variable,
            entity,
            from_index,
            to_index,
        );
    }

    fn before_list_variable_element_assigned(&mut self, variable: VariableId, element: usize) {
        self.calculator
            .before_list_element_assigned(&self.working_solution, variable, element);
    }

    fn after_list_variable_element_assigned(&mut self, variable: VariableId, element: usize) {
        if self.counts_unassigned_elements(variable) {
            self.working_init_score += 1;
        }
        self.calculator
            .after_list_element_assigned(&self.working_solution, variable, element);
    }

    fn before_list_variable_element_unassigned(&mut self, variable: VariableId, element: usize) {
        self.calculator
            .before_list_element_unassigned(&self.working_solution, variable, element);
    }

    fn after_list_variable_element_unassigned(&mut self, variable: VariableId, element: usize) {
        if self.counts_unassigned_elements(variable) {
            self.working_init_score -= 1;
        }
        self.listener_support
            .after_list_element_unassigned(variable, element);
        self.calculator
            .after_list_element_unassigned(&self.working_solution, variable, element);
    }

    fn before_entity_removed(&mut self, entity: EntityHandle) -> Result<()> {
        self.working_init_score += self
            .descriptor
            .count_uninitialized_variables(&self.working_solution, entity);
        self.remove_from_lookup(ObjectHandle::Entity(entity))?;
        self.listener_support
            .before_entity_removed(&self.working_solution, entity);
        self.calculator
            .before_entity_removed(&self.working_solution, entity);
        Ok(())
    }

    fn after_entity_removed(&mut self, entity: EntityHandle) -> Result<()> {
        if let Some(lookup) = &mut self.lookup {
            lookup.reindex_entities(&self.descriptor, &self.working_solution, entity.descriptor_index)?;
        }
        self.calculator
            .after_entity_removed(&self.working_solution, entity);
        self.bump_entity_list_revision();
        Ok(())
    }

    fn before_problem_fact_added(&mut self, _fact: FactHandle) {}

    fn after_problem_fact_added(&mut self, fact: FactHandle) -> Result<()> {
        if let Some(lookup) = &mut self.lookup {
            lookup.add_fact(&self.descriptor, &self.working_solution, fact)?;
        }
        self.reset_listeners_and_calculator();
        Ok(())
    }

    fn before_problem_property_changed(&mut self, _object: ObjectHandle) {}

    fn after_problem_property_changed(&mut self, object: ObjectHandle) -> Result<()> {
        // The changed property may be the planning id.
        if let Some(lookup) = &mut self.lookup {
            match object {
                ObjectHandle::Entity(entity) => lookup.reindex_entities(
                    &self.descriptor,
                    &self.working_solution,
                    entity.descriptor_index,
                )?,
                ObjectHandle::Fact(fact) => {
                    lookup.reindex_facts(&self.descriptor, &self.working_solution, fact.descriptor_index)?
                }
            }
        }
        self.reset_listeners_and_calculator();
        Ok(())
    }

    fn before_problem_fact_removed(&mut self, fact: FactHandle) -> Result<()> {
        self.remove_from_lookup(ObjectHandle::Fact(fact))
    }

    fn after_problem_fact_removed(&mut self, fact: FactHandle) -> Result<()> {
        if let Some(lookup) = &mut self.lookup {
            lookup.reindex_facts(&self.descriptor, &self.working_solution, fact.descriptor_index)?;
        }
        self.reset_listeners_and_calculator();
        Ok(())
    }

    fn look_up_working_object(&self, type_name: &str, id: &PlanningIdValue) -> Result<ObjectHandle> {
        self.lookup
            .as_ref()
            .ok_or(PlanwrightError::LookupDisabled)?
            .look_up_or_fail(type_name, id)
    }

    fn look_up_working_object_or_none(
        &self,
        type_name: &str,
        id: &PlanningIdValue,
    ) -> Result<Option<ObjectHandle>> {
        Ok(self
            .lookup
            .as_ref()
            .ok_or(PlanwrightError::LookupDisabled)?
            .look_up(type_name, id))
    }

    fn working_init_score(&self) -> i32 {
        self.working_init_score
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn assert_non_null_planning_ids(&self) -> Result<()> {
        DefaultScoreDirector::assert_non_null_planning_ids(self)
    }
}

impl<S: PlanningSolution> fmt::Debug for DefaultScoreDirector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultScoreDirector")
            .field("solution", &self.descriptor.type_name)
            .field("working_init_score", &self.working_init_score)
            .field("working_entity_list_revision", &self.working_entity_list_revision)
            .field("calculation_count", &self.calculation_count)
            .field("lookup_enabled", &self.lookup.is_some())
            .field("listener_support", &self.listener_support)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Routes shadow changes announced by listeners to the score calculator.
struct CalculatorObserver<'a, S: PlanningSolution> {
    calculator: &'a mut dyn ScoreCalculator<S>,
}

impl<S: PlanningSolution> VariableChangeObserver<S> for CalculatorObserver<'_, S> {
    fn before_variable_changed(&mut self, solution: &S, variable: VariableId, entity: EntityHandle) {
        self.calculator
            .before_variable_changed(solution, variable, entity);
    }

    fn after_variable_changed(&mut self, solution: &S, variable: VariableId, entity: EntityHandle) {
        self.calculator
            .after_variable_changed(solution, variable, entity);
    }
}
