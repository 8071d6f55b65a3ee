//! Consolidated tests for director module.
//!
//! Covers the mutation protocol, init score bookkeeping, the working-object
//! lookup, cloning assertions and the corruption diagnostics.

use std::sync::Arc;

use planwright_config::{EnvironmentMode, ScoreDirectorConfig, SolverConfig};
use planwright_core::domain::{
    EntityDescriptor, EntityHandle, FactHandle, ObjectHandle, PlanningIdValue, PlanningSolution,
    SolutionDescriptor, VariableDescriptor, VariableId,
};
use planwright_core::score::{HardSoftScore, Score, SimpleScore};
use planwright_core::{ConstraintRef, PlanwrightError};
use planwright_test::init_test_logging;
use planwright_test::nqueens::{calculate_conflicts, nqueens_descriptor, NQueensSolution, ROW};
use planwright_test::routing::{
    calculate_routing_score, insert_visit, optional_routing_descriptor, remove_visit,
    route_len, routing_descriptor, visit_at, Routing, VISITS,
};
use planwright_test::schedule::{
    calculate_schedule_score, end_penalties, faulty_schedule_descriptor, room_conflicts,
    schedule_descriptor, Room, Schedule, Task, END, ROOM, SLOT,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::calculator::{MatchingScoreCalculator, ScoreCalculator};
use crate::constraint_match::ConstraintMatch;
use crate::moves::{ChangeMove, ListAssignMove, ListUnassignMove, ListVariableAccess, Move};

// ============================================================================
// Fixtures
// ============================================================================

fn schedule_factory() -> ScoreDirectorFactory<Schedule> {
    ScoreDirectorFactory::easy(schedule_descriptor(), calculate_schedule_score)
}

fn schedule_matches(solution: &Schedule) -> Vec<ConstraintMatch<HardSoftScore>> {
    let mut matches: Vec<_> = room_conflicts(solution)
        .into_iter()
        .map(|(a, b)| {
            ConstraintMatch::new(
                ConstraintRef::new("schedule", "Room conflict"),
                [
                    ObjectHandle::from(EntityHandle::new(0, a)),
                    ObjectHandle::from(EntityHandle::new(0, b)),
                ],
                HardSoftScore::of(-1, 0),
            )
        })
        .collect();
    matches.extend(end_penalties(solution).into_iter().map(|(task, end)| {
        ConstraintMatch::new(
            ConstraintRef::new("schedule", "End time"),
            [ObjectHandle::from(EntityHandle::new(0, task))],
            HardSoftScore::of(0, -end),
        )
    }));
    matches
}

/// Forgets the end time penalty of the first task.
fn forgetful_schedule_matches(solution: &Schedule) -> Vec<ConstraintMatch<HardSoftScore>> {
    schedule_matches(solution)
        .into_iter()
        .filter(|m| {
            let first_task = ObjectHandle::from(EntityHandle::new(0, 0));
            !(m.constraint.name == "End time" && m.justifications[0] == first_task)
        })
        .collect()
}

/// Keeps the soft level incrementally from the `end` shadow variable.
///
/// With `skip_first_assignment` it ignores ends that were unassigned before,
/// which corrupts the score.
#[derive(Default)]
struct IncrementalScheduleCalculator {
    ends: Vec<Option<usize>>,
    soft: i64,
    skip_first_assignment: bool,
}

impl ScoreCalculator<Schedule> for IncrementalScheduleCalculator {
    fn reset_working_solution(&mut self, solution: &Schedule, _constraint_match_enabled: bool) {
        self.ends = solution.tasks.iter().map(|t| t.end).collect();
        self.soft = self.ends.iter().flatten().map(|&end| end as i64).sum();
    }

    fn calculate_score(&mut self, solution: &Schedule) -> HardSoftScore {
        HardSoftScore::of(-(room_conflicts(solution).len() as i64), -self.soft)
    }

    fn after_variable_changed(&mut self, solution: &Schedule, variable: VariableId, entity: EntityHandle) {
        if variable != END {
            return;
        }
        let old = self.ends[entity.index];
        if self.skip_first_assignment && old.is_none() {
            return;
        }
        let new = solution.tasks[entity.index].end;
        self.soft += new.unwrap_or(0) as i64 - old.unwrap_or(0) as i64;
        self.ends[entity.index] = new;
    }
}

fn task_slot(s: &Schedule, i: usize) -> Option<usize> {
    s.tasks[i].slot
}

fn set_task_slot(s: &mut Schedule, i: usize, slot: Option<usize>) {
    s.tasks[i].slot = slot;
}

fn task_room(s: &Schedule, i: usize) -> Option<usize> {
    s.tasks[i].room
}

fn set_task_room(s: &mut Schedule, i: usize, room: Option<usize>) {
    s.tasks[i].room = room;
}

fn slot_move(task: usize, slot: Option<usize>) -> ChangeMove<Schedule, usize> {
    ChangeMove::new(SLOT, task, slot, task_slot, set_task_slot)
}

fn room_move(task: usize, room: Option<usize>) -> ChangeMove<Schedule, usize> {
    ChangeMove::new(ROOM, task, room, task_room, set_task_room)
}

/// Puts a task into a room and a slot through the director.
fn assign(director: &mut dyn ScoreDirector<Schedule>, task: usize, room: usize, slot: usize) {
    room_move(task, Some(room)).do_move(director);
    slot_move(task, Some(slot)).do_move(director);
}

fn visits() -> ListVariableAccess<Routing> {
    ListVariableAccess {
        variable: VISITS,
        len: route_len,
        element_at: visit_at,
        insert: insert_visit,
        remove: remove_visit,
    }
}

fn expected_schedule_score(director: &DefaultScoreDirector<Schedule>) -> HardSoftScore {
    let solution = director.working_solution();
    let uninitialized = director.solution_descriptor().count_uninitialized(solution);
    calculate_schedule_score(solution).with_init_score(-uninitialized)
}

/// Undo move that does nothing.
#[derive(Debug)]
struct NoUndo;

impl Move<Schedule> for NoUndo {
    fn is_doable(&self, _: &dyn ScoreDirector<Schedule>) -> bool {
        false
    }

    fn do_move(&self, _: &mut dyn ScoreDirector<Schedule>) -> Box<dyn Move<Schedule>> {
        Box::new(NoUndo)
    }
}

/// Changes a slot but returns an undo move that does nothing.
#[derive(Debug)]
struct BrokenUndoMove(ChangeMove<Schedule, usize>);

impl Move<Schedule> for BrokenUndoMove {
    fn is_doable(&self, score_director: &dyn ScoreDirector<Schedule>) -> bool {
        self.0.is_doable(score_director)
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<Schedule>) -> Box<dyn Move<Schedule>> {
        self.0.do_move(score_director);
        Box::new(NoUndo)
    }
}

// ============================================================================
// Working solution and init score
// ============================================================================

#[test]
fn test_set_working_solution_counts_init_score() {
    init_test_logging();
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(2, 3))
        .unwrap();

    assert_eq!(director.working_init_score(), -6);
    let score = director.calculate_score().unwrap();
    assert_eq!(score, HardSoftScore::of_uninitialized(-6, 0, 0));
    assert_eq!(director.working_solution().score, Some(score));
    assert_eq!(director.calculation_count(), 1);
}

#[test]
fn test_unassigned_entity_scores_uninitialized() {
    let factory = ScoreDirectorFactory::easy(nqueens_descriptor(), calculate_conflicts);
    let mut director = factory
        .build_score_director(NQueensSolution::with_optional_rows(&[Some(0), None]))
        .unwrap();

    assert_eq!(director.working_init_score(), -1);
    let score = director.calculate_score().unwrap();
    assert_eq!(score, SimpleScore::of_uninitialized(-1, 0));
    assert!(!score.is_solution_initialized());

    director.change_variable(ROW, EntityHandle::new(0, 1), &mut |s: &mut NQueensSolution| s.queens[1].row = Some(2));
    director.trigger_variable_listeners();
    assert_eq!(director.working_init_score(), 0);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(0));
}

#[test]
fn test_unassigning_variable_decrements_init_score() {
    let factory = ScoreDirectorFactory::easy(nqueens_descriptor(), calculate_conflicts);
    let mut director = factory
        .build_score_director(NQueensSolution::with_rows(&[0, 2]))
        .unwrap();
    assert_eq!(director.working_init_score(), 0);

    director.change_variable(ROW, EntityHandle::new(0, 0), &mut |s: &mut NQueensSolution| s.queens[0].row = None);
    assert_eq!(director.working_init_score(), -1);
    // Reassigning an assigned variable leaves the init score alone.
    director.change_variable(ROW, EntityHandle::new(0, 1), &mut |s: &mut NQueensSolution| s.queens[1].row = Some(3));
    assert_eq!(director.working_init_score(), -1);
}

#[test]
fn test_listener_chain_updates_shadows() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(2, 3))
        .unwrap();

    director.change_variable(SLOT, EntityHandle::new(0, 1), &mut |s: &mut Schedule| s.tasks[1].slot = Some(2));
    let score = director.calculate_score().unwrap();

    let task = &director.working_solution().tasks[1];
    assert_eq!(task.start, Some(20));
    assert_eq!(task.end, Some(26));
    assert_eq!(score, HardSoftScore::of_uninitialized(-5, 0, -26));
}

#[test]
fn test_shadow_changes_reach_incremental_calculator() {
    let factory = ScoreDirectorFactory::new(schedule_descriptor(), IncrementalScheduleCalculator::default);
    let mut director = factory.build_score_director(Schedule::unassigned(3, 6)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..200 {
        let task = rng.random_range(0..6);
        let value = rng.random_bool(0.8).then(|| rng.random_range(0..3));
        let mv = if rng.random_bool(0.5) {
            slot_move(task, value)
        } else {
            room_move(task, value)
        };
        mv.do_move(&mut director);
        let score = director.calculate_score().unwrap();
        assert_eq!(score, expected_schedule_score(&director));
    }
}

#[test]
fn test_init_score_invariant_under_random_entity_changes() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(2, 4))
        .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut next_id = 1000;

    for _ in 0..300 {
        let task_count = director.working_solution().tasks.len();
        match rng.random_range(0..4) {
            0 => {
                let entity = EntityHandle::new(0, task_count);
                let mut task = Task::new(next_id, 5);
                next_id += 1;
                if rng.random_bool(0.5) {
                    task = task.assigned(rng.random_range(0..2), rng.random_range(0..4));
                }
                director.before_entity_added(entity);
                director.working_solution_mut().tasks.push(task);
                director.after_entity_added(entity).unwrap();
            }
            1 if task_count > 0 => {
                let index = rng.random_range(0..task_count);
                let entity = EntityHandle::new(0, index);
                director.before_entity_removed(entity).unwrap();
                director.working_solution_mut().tasks.remove(index);
                director.after_entity_removed(entity).unwrap();
            }
            _ if task_count > 0 => {
                let task = rng.random_range(0..task_count);
                let value = rng.random_bool(0.7).then(|| rng.random_range(0..4));
                room_move(task, value).do_move(&mut director);
                slot_move(task, value).do_move(&mut director);
            }
            _ => {}
        }
        let score = director.calculate_score().unwrap();
        let solution = director.working_solution();
        assert_eq!(
            director.working_init_score(),
            -director.solution_descriptor().count_uninitialized(solution)
        );
        assert_eq!(score, expected_schedule_score(&director));
        for task in &solution.tasks {
            assert_eq!(task.start, task.slot.map(|slot| slot * 10));
        }
    }
    assert!(director.assert_non_null_planning_ids().is_ok());
}

#[test]
fn test_list_assign_and_unassign_track_init_score() {
    let factory = ScoreDirectorFactory::easy(routing_descriptor(), calculate_routing_score);
    let mut director = factory.build_score_director(Routing::new(2, 3)).unwrap();
    assert_eq!(director.working_init_score(), -3);

    let undo = ListAssignMove::new(visits(), 0, 1, 0).do_move(&mut director);
    assert_eq!(director.working_init_score(), -2);
    let score = director.calculate_score().unwrap();
    assert_eq!(score, SimpleScore::of_uninitialized(-2, -1));
    assert_eq!(director.working_solution().customers[0].vehicle, Some(1));

    undo.do_move(&mut director);
    assert_eq!(director.working_init_score(), -3);
    director.calculate_score().unwrap();
    assert_eq!(director.working_solution().customers[0].vehicle, None);
    assert!(director.working_solution().vehicles[1].visits.is_empty());
}

#[test]
fn test_optional_list_never_counts_unassigned_elements() {
    let factory = ScoreDirectorFactory::easy(optional_routing_descriptor(), calculate_routing_score);
    let mut director = factory.build_score_director(Routing::new(1, 4)).unwrap();
    assert_eq!(director.working_init_score(), 0);

    ListAssignMove::new(visits(), 2, 0, 0).do_move(&mut director);
    assert_eq!(director.working_init_score(), 0);
    assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
}

#[test]
fn test_whole_list_change_adjusts_init_score() {
    let factory = ScoreDirectorFactory::easy(routing_descriptor(), calculate_routing_score);
    let mut director = factory.build_score_director(Routing::new(2, 3)).unwrap();

    director.change_variable(VISITS, EntityHandle::new(0, 0), &mut |s: &mut Routing| {
        s.vehicles[0].visits = vec![2, 0]
    });
    assert_eq!(director.working_init_score(), -1);
    director.calculate_score().unwrap();
    assert_eq!(director.working_solution().customers[2].vehicle, Some(0));
    assert_eq!(director.working_solution().customers[0].vehicle, Some(0));
}

#[test]
fn test_set_working_solution_returns_previous() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 2))
        .unwrap();
    let revision = director.working_entity_list_revision();

    let assigned = Schedule::new(1, vec![Task::new(0, 5).assigned(0, 1)]);
    let previous = director.set_working_solution(assigned).unwrap();

    assert_eq!(previous.tasks.len(), 2);
    assert_eq!(director.working_init_score(), 0);
    assert!(director.is_working_entity_list_dirty(revision));
    // Shadows only follow notifications, so the new task's start is stale.
    let score = director.calculate_score().unwrap();
    assert_eq!(score, HardSoftScore::of(0, 0));
    director.assert_shadow_variables_are_not_stale(score, "set").unwrap_err();
}

#[test]
fn test_calculator_init_score_is_rejected() {
    let factory = ScoreDirectorFactory::easy(nqueens_descriptor(), |_: &NQueensSolution| {
        SimpleScore::of_uninitialized(-1, 0)
    });
    let mut director = factory
        .build_score_director(NQueensSolution::with_rows(&[0]))
        .unwrap();

    assert!(matches!(
        director.calculate_score(),
        Err(PlanwrightError::CalculatorInitScore(_))
    ));
}

#[test]
fn test_calculation_count() {
    let factory = ScoreDirectorFactory::easy(nqueens_descriptor(), calculate_conflicts);
    let mut director = factory
        .build_score_director(NQueensSolution::with_rows(&[0, 1]))
        .unwrap();

    director.calculate_score().unwrap();
    director.calculate_score().unwrap();
    assert_eq!(director.calculation_count(), 2);
    director.reset_calculation_count();
    assert_eq!(director.calculation_count(), 0);
}

#[test]
fn test_close_is_idempotent() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();

    director.close();
    director.close();
    assert!(director.is_closed());
    assert!(matches!(
        director.look_up_working_object("Task", &PlanningIdValue::Int(0)),
        Err(PlanwrightError::UnknownWorkingObject { .. })
    ));

    let solution = director.take_working_solution();
    assert_eq!(solution.tasks.len(), 1);
}

// ============================================================================
// Entity list revision
// ============================================================================

#[test]
fn test_entity_list_revision() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();
    let revision = director.working_entity_list_revision();
    assert!(!director.is_working_entity_list_dirty(revision));

    director.set_all_changes_will_be_undone_before_step_ends(true);
    let entity = EntityHandle::new(0, 1);
    director.before_entity_added(entity);
    director.working_solution_mut().tasks.push(Task::new(1, 5));
    director.after_entity_added(entity).unwrap();
    assert!(!director.is_working_entity_list_dirty(revision));

    director.set_all_changes_will_be_undone_before_step_ends(false);
    director.before_entity_removed(entity).unwrap();
    director.working_solution_mut().tasks.pop();
    director.after_entity_removed(entity).unwrap();
    assert!(director.is_working_entity_list_dirty(revision));
}

// ============================================================================
// Moves
// ============================================================================

#[test]
fn test_do_and_process_move_restores_solution() {
    let mut director = schedule_factory()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .build_score_director(Schedule::unassigned(2, 2))
        .unwrap();
    assign(&mut director, 0, 0, 0);
    slot_move(1, Some(0)).do_move(&mut director);
    let before_score = director.calculate_score().unwrap();
    let before = director.working_solution().clone();

    let moved_score = director
        .do_and_process_move(&room_move(1, Some(0)), true)
        .unwrap();
    assert_eq!(before_score, HardSoftScore::of_uninitialized(-1, 0, -11));
    assert_eq!(moved_score, HardSoftScore::of(-1, -11));

    assert_eq!(director.calculate_score().unwrap(), before_score);
    assert_eq!(director.working_solution(), &before);
}

#[test]
fn test_random_moves_round_trip() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(2, 5))
        .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for _ in 0..100 {
        let before_score = director.calculate_score().unwrap();
        let before = director.working_solution().clone();
        let task = rng.random_range(0..5);
        let value = rng.random_bool(0.8).then(|| rng.random_range(0..3));
        let mv = if rng.random_bool(0.5) {
            slot_move(task, value)
        } else {
            room_move(task, value)
        };

        let undo = mv.do_move(&mut director);
        director.calculate_score().unwrap();
        undo.do_move(&mut director);
        director
            .assert_expected_undo_move_score(&mv, undo.as_ref(), before_score)
            .unwrap();
        assert_eq!(director.working_solution(), &before);

        // Keep the state moving forward.
        mv.do_move(&mut director);
    }
}

#[test]
fn test_list_moves_round_trip() {
    let factory = ScoreDirectorFactory::easy(routing_descriptor(), calculate_routing_score);
    let mut routing = Routing::new(2, 4);
    routing.vehicles[0].visits = vec![0, 1];
    routing.customers[0].vehicle = Some(0);
    routing.customers[1].vehicle = Some(0);
    let mut director = factory.build_score_director(routing).unwrap();
    let before_score = director.calculate_score().unwrap();
    let before = director.working_solution().clone();

    let unassign = ListUnassignMove::new(visits(), 0, 0);
    assert!(unassign.is_doable(&director));
    let undo = unassign.do_move(&mut director);
    director.calculate_score().unwrap();
    assert_eq!(director.working_solution().vehicles[0].visits, vec![1]);
    assert_eq!(director.working_solution().customers[0].vehicle, None);

    undo.do_move(&mut director);
    assert_eq!(director.calculate_score().unwrap(), before_score);
    assert_eq!(director.working_solution(), &before);
}

#[test]
fn test_change_move_is_doable() {
    let director = schedule_factory()
        .build_score_director(Schedule::new(1, vec![Task::new(0, 5).assigned(0, 1)]))
        .unwrap();

    assert!(!slot_move(0, Some(1)).is_doable(&director));
    assert!(slot_move(0, Some(2)).is_doable(&director));
    assert!(slot_move(0, None).is_doable(&director));
}

// ============================================================================
// Score corruption
// ============================================================================

#[test]
fn test_working_score_from_scratch_passes() {
    let mut director = schedule_factory()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .build_score_director(Schedule::unassigned(2, 3))
        .unwrap();
    slot_move(0, Some(1)).do_move(&mut director);
    let score = director.calculate_score().unwrap();

    director.assert_working_score_from_scratch(score, "slot").unwrap();
    director.assert_expected_working_score(score, "slot").unwrap();
}

#[test]
fn test_score_corruption_analysis() {
    let factory = ScoreDirectorFactory::new(schedule_descriptor(), || {
        MatchingScoreCalculator::new(forgetful_schedule_matches)
    })
    .with_environment_mode(EnvironmentMode::FullAssert)
    .with_constraint_match_enabled(true)
    .with_assertion_calculator(|| MatchingScoreCalculator::new(schedule_matches))
    .unwrap();
    let mut director = factory
        .build_score_director(Schedule::new(1, vec![Task::new(0, 5), Task::new(1, 6)]))
        .unwrap();
    slot_move(0, Some(1)).do_move(&mut director);
    let score = director.calculate_score().unwrap();

    let Err(PlanwrightError::ScoreCorruption(message)) =
        director.assert_working_score_from_scratch(score, "Assign task 0")
    else {
        panic!("expected a score corruption");
    };
    assert!(message.starts_with("Score corruption (15soft): the workingScore"));
    assert!(message.contains("after completedAction (Assign task 0)"));
    assert!(message.contains("has no ConstraintMatch(es) which are in excess."));
    assert!(message.contains("has 1 ConstraintMatch(es) which are missing:"));
    assert!(message.contains("    schedule/End time/[Entity(0:0)]=-15soft"));
    assert!(message.contains("Check your score constraints.\n"));
    assert!(message.ends_with("Shadow variable corruption in the corrupted scoreDirector:\n  None"));
}

#[test]
fn test_score_corruption_analysis_caps_examples() {
    let uncorrupted = ScoreDirectorFactory::new(schedule_descriptor(), || {
        MatchingScoreCalculator::new(schedule_matches)
    });
    let factory = ScoreDirectorFactory::new(schedule_descriptor(), || {
        MatchingScoreCalculator::new(|_: &Schedule| Vec::new())
    })
    .with_environment_mode(EnvironmentMode::FastAssert)
    .with_constraint_match_enabled(true)
    .with_assertion_factory(uncorrupted)
    .unwrap();
    let mut director = factory.build_score_director(Schedule::unassigned(1, 10)).unwrap();
    for task in 0..10 {
        assign(&mut director, task, 0, task);
    }
    let score = director.calculate_score().unwrap();

    let message = director
        .assert_working_score_from_scratch(score, "load")
        .unwrap_err()
        .to_string();
    assert!(message.contains("has 10 ConstraintMatch(es) which are missing:"));
    assert!(message.contains("    ... 2 more"));
}

#[test]
fn test_score_corruption_without_constraint_matches() {
    let factory = ScoreDirectorFactory::new(schedule_descriptor(), || IncrementalScheduleCalculator {
        skip_first_assignment: true,
        ..Default::default()
    })
    .with_environment_mode(EnvironmentMode::FullAssert);
    let mut director = factory
        .build_score_director(Schedule::new(1, vec![Task::new(0, 5)]))
        .unwrap();
    slot_move(0, Some(1)).do_move(&mut director);
    let score = director.calculate_score().unwrap();
    assert_eq!(score, HardSoftScore::of_uninitialized(-1, 0, 0));

    let message = director
        .assert_working_score_from_scratch(score, "Assign task 0")
        .unwrap_err()
        .to_string();
    assert!(message.starts_with("Score corruption (15soft)"));
    assert!(message.contains(
        "either corrupted constraintMatchEnabled (false) or uncorrupted constraintMatchEnabled (false) is disabled"
    ));
}

#[test]
fn test_predicted_score_corruption() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();
    assign(&mut director, 0, 0, 0);

    let message = director
        .assert_predicted_score_from_scratch(HardSoftScore::of(0, -1), "predict")
        .unwrap_err()
        .to_string();
    assert!(message.contains("the predictedScore (0hard/-1soft) is not the uncorruptedScore (0hard/-5soft)"));
    assert!(message.contains("Shadow variable corruption in the working scoreDirector:\n  None"));
}

#[test]
fn test_score_corruption_reports_stale_shadows() {
    let factory = ScoreDirectorFactory::easy(faulty_schedule_descriptor(), calculate_schedule_score);
    let mut director = factory
        .build_score_director(Schedule::unassigned(1, 2))
        .unwrap();
    slot_move(0, Some(1)).do_move(&mut director);
    let bogus = HardSoftScore::of_uninitialized(-3, 0, -999);

    let Err(PlanwrightError::ScoreCorruption(message)) =
        director.assert_working_score_from_scratch(bogus, "Assign task 0")
    else {
        panic!("expected a score corruption");
    };
    let score_part = message.find("Score corruption analysis").unwrap();
    let shadow_part = message.find("Shadow variable corruption in the corrupted scoreDirector:").unwrap();
    assert!(score_part < shadow_part);
    assert!(message.contains(
        "The entity (Task[0])'s shadow variable (Task.start)'s corrupted value (None) changed to uncorrupted value (Some(10))"
    ));
    assert!(message.ends_with("Maybe there is a bug in the VariableListener of those shadow variable(s)."));

    let message = director
        .assert_predicted_score_from_scratch(bogus, "Predict task 0")
        .unwrap_err()
        .to_string();
    // The first report repaired the shadows.
    assert!(message.contains("Shadow variable corruption in the working scoreDirector:\n  None"));
}

#[test]
fn test_expected_working_score_mismatch() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();
    assign(&mut director, 0, 0, 0);

    assert!(matches!(
        director.assert_expected_working_score(HardSoftScore::of(0, -1), "step"),
        Err(PlanwrightError::ScoreCorruption(_))
    ));
}

// ============================================================================
// Shadow variable staleness
// ============================================================================

#[test]
fn test_fresh_shadows_are_not_stale() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(2, 3))
        .unwrap();
    slot_move(2, Some(3)).do_move(&mut director);
    let score = director.calculate_score().unwrap();

    director.assert_shadow_variables_are_not_stale(score, "slot").unwrap();
}

#[test]
fn test_stale_shadow_is_reported() {
    let factory = ScoreDirectorFactory::easy(faulty_schedule_descriptor(), calculate_schedule_score);
    let mut director = factory
        .build_score_director(Schedule::unassigned(1, 2))
        .unwrap();
    slot_move(0, Some(1)).do_move(&mut director);
    let score = director.calculate_score().unwrap();
    assert_eq!(director.working_solution().tasks[0].start, None);

    let Err(PlanwrightError::ShadowVariableCorruption(message)) =
        director.assert_shadow_variables_are_not_stale(score, "Assign task 0")
    else {
        panic!("expected a shadow variable corruption");
    };
    assert!(message.starts_with("VariableListener corruption after completedAction (Assign task 0):"));
    assert!(message.contains(
        "The entity (Task[0])'s shadow variable (Task.start)'s corrupted value (None) changed to uncorrupted value (Some(10))"
    ));
    // Global order: start is reported before end.
    let start = message.find("(Task.start)").unwrap();
    let end = message.find("(Task.end)").unwrap();
    assert!(start < end);
    // The force trigger repaired the shadows.
    assert_eq!(director.working_solution().tasks[0].end, Some(15));
}

#[test]
fn test_score_mismatch_without_stale_shadows_blames_the_calculator() {
    let factory = ScoreDirectorFactory::new(schedule_descriptor(), || IncrementalScheduleCalculator {
        skip_first_assignment: true,
        ..Default::default()
    })
    .with_environment_mode(EnvironmentMode::FullAssert);
    let mut director = factory
        .build_score_director(Schedule::new(1, vec![Task::new(0, 5)]))
        .unwrap();
    slot_move(0, Some(1)).do_move(&mut director);
    let expected = HardSoftScore::of_uninitialized(-1, 0, -15);

    let Err(PlanwrightError::ScoreCorruption(message)) =
        director.assert_shadow_variables_are_not_stale(expected, "Assign task 0")
    else {
        panic!("expected the calculator to be blamed");
    };
    assert!(message.starts_with("Score corruption (15soft): the workingScore"));
    assert!(message.contains("assert_shadow_variables_are_not_stale(-1init/0hard/-15soft, Assign task 0)"));
}

#[test]
fn test_stale_shadow_report_is_capped() {
    let factory = ScoreDirectorFactory::easy(faulty_schedule_descriptor(), calculate_schedule_score);
    let mut director = factory
        .build_score_director(Schedule::unassigned(1, 5))
        .unwrap();
    for task in 0..5 {
        slot_move(task, Some(task)).do_move(&mut director);
    }
    let score = director.calculate_score().unwrap();

    let message = director
        .assert_shadow_variables_are_not_stale(score, "Assign all")
        .unwrap_err()
        .to_string();
    assert_eq!(message.matches("(Task.start)").count(), 3);
    assert!(message.contains("  ... 2 more"));
}

// ============================================================================
// Undo moves
// ============================================================================

#[test]
fn test_undo_move_corruption() {
    let mut director = schedule_factory()
        .with_environment_mode(EnvironmentMode::FastAssert)
        .build_score_director(Schedule::unassigned(1, 2))
        .unwrap();
    let before_score = director.calculate_score().unwrap();

    let mv = BrokenUndoMove(slot_move(0, Some(1)));
    let undo = mv.do_move(&mut director);
    director.calculate_score().unwrap();
    undo.do_move(&mut director);

    let Err(PlanwrightError::UndoMoveCorruption(message)) =
        director.assert_expected_undo_move_score(&mv, undo.as_ref(), before_score)
    else {
        panic!("expected an undo move corruption");
    };
    assert!(message.starts_with("UndoMove corruption ("));
    assert!(message.contains("the beforeMoveScore (-4init/0hard/0soft)"));
    assert!(message.contains("It might return a corrupted undo move (NoUndo)."));
}

#[test]
fn test_undo_move_reports_score_corruption_first() {
    let factory = ScoreDirectorFactory::new(schedule_descriptor(), || IncrementalScheduleCalculator {
        skip_first_assignment: true,
        ..Default::default()
    })
    .with_environment_mode(EnvironmentMode::FullAssert);
    let mut director = factory
        .build_score_director(Schedule::new(1, vec![Task::new(0, 5)]))
        .unwrap();
    let before_score = director.calculate_score().unwrap();

    let mv = BrokenUndoMove(slot_move(0, Some(1)));
    let undo = mv.do_move(&mut director);
    undo.do_move(&mut director);

    let result = director.assert_expected_undo_move_score(&mv, undo.as_ref(), before_score);
    assert!(matches!(result, Err(PlanwrightError::ScoreCorruption(_))));
}

// ============================================================================
// Cloning
// ============================================================================

#[test]
fn test_clone_working_solution_is_independent() {
    let mut director = schedule_factory()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .build_score_director(Schedule::unassigned(1, 2))
        .unwrap();
    director.calculate_score().unwrap();

    let mut clone = director.clone_working_solution().unwrap();
    clone.tasks[0].slot = Some(3);
    assert_eq!(director.working_solution().tasks[0].slot, None);
    assert_eq!(clone.score, director.working_solution().score);
}

#[test]
fn test_cloner_losing_score_is_detected() {
    let mut director = schedule_factory()
        .with_environment_mode(EnvironmentMode::NonIntrusiveFullAssert)
        .with_solution_cloner(|s: &Schedule| Schedule {
            score: None,
            ..s.clone()
        })
        .build_score_director(Schedule::unassigned(1, 2))
        .unwrap();
    director.calculate_score().unwrap();

    let Err(PlanwrightError::CloningCorruption(message)) = director.clone_working_solution() else {
        panic!("expected a cloning corruption");
    };
    assert!(message.contains("the cloneScore (None) is not the originalScore"));
}

#[test]
fn test_cloned_solution_is_unchecked_when_not_asserted() {
    let director = schedule_factory()
        .with_solution_cloner(|s: &Schedule| Schedule {
            score: Some(HardSoftScore::of(-9, 0)),
            ..s.clone()
        })
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();

    assert!(director.clone_working_solution().is_ok());
}

/// A solution whose clone shares the task storage.
#[derive(Clone, Debug)]
struct SharedTasks {
    tasks: Arc<Vec<Task>>,
    score: Option<SimpleScore>,
}

impl PlanningSolution for SharedTasks {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

#[test]
fn test_shared_entity_instance_is_detected() {
    let descriptor = SolutionDescriptor::builder("SharedTasks")
        .with_entity(
            EntityDescriptor::new("Task", |s: &SharedTasks| s.tasks.len())
                .with_identity(|s: &SharedTasks, i| &s.tasks[i] as *const Task as usize)
                .with_variable(VariableDescriptor::basic("slot", |s: &SharedTasks, i| {
                    s.tasks[i].slot.is_some()
                })),
        )
        .build()
        .unwrap();
    let factory = ScoreDirectorFactory::easy(descriptor, |_: &SharedTasks| SimpleScore::ZERO)
        .with_environment_mode(EnvironmentMode::FullAssert);
    let director = factory
        .build_score_director(SharedTasks {
            tasks: Arc::new(vec![Task::new(0, 5).assigned(0, 0)]),
            score: None,
        })
        .unwrap();

    let Err(PlanwrightError::CloningCorruption(message)) = director.clone_working_solution() else {
        panic!("expected a cloning corruption");
    };
    assert!(message.contains("the cloned entity (Task[0]) is the same instance as an original entity"));
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_look_up_working_objects() {
    let director = schedule_factory()
        .build_score_director(Schedule::unassigned(2, 3))
        .unwrap();

    assert_eq!(
        director
            .look_up_working_object("Task", &PlanningIdValue::Int(1))
            .unwrap(),
        ObjectHandle::Entity(EntityHandle::new(0, 1))
    );
    assert_eq!(
        director
            .look_up_working_object("Room", &PlanningIdValue::from("room-1"))
            .unwrap(),
        ObjectHandle::Fact(FactHandle::new(0, 1))
    );
    assert!(matches!(
        director.look_up_working_object("Task", &PlanningIdValue::Int(99)),
        Err(PlanwrightError::UnknownWorkingObject { .. })
    ));
    assert_eq!(
        director
            .look_up_working_object_or_none("Task", &PlanningIdValue::Int(99))
            .unwrap(),
        None
    );
}

#[test]
fn test_look_up_requires_lookup() {
    let director = schedule_factory()
        .with_lookup_enabled(false)
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();

    assert!(matches!(
        director.look_up_working_object("Task", &PlanningIdValue::Int(0)),
        Err(PlanwrightError::LookupDisabled)
    ));
    assert!(matches!(
        director.look_up_working_object_or_none("Task", &PlanningIdValue::Int(0)),
        Err(PlanwrightError::LookupDisabled)
    ));
}

#[test]
fn test_entity_removal_reindexes_lookup() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 3))
        .unwrap();

    let removed = EntityHandle::new(0, 0);
    director.before_entity_removed(removed).unwrap();
    director.working_solution_mut().tasks.remove(0);
    director.after_entity_removed(removed).unwrap();

    assert_eq!(
        director
            .look_up_working_object("Task", &PlanningIdValue::Int(2))
            .unwrap(),
        ObjectHandle::Entity(EntityHandle::new(0, 1))
    );
    assert_eq!(
        director
            .look_up_working_object_or_none("Task", &PlanningIdValue::Int(0))
            .unwrap(),
        None
    );
    assert_eq!(director.working_init_score(), -4);
}

#[test]
fn test_problem_fact_changes_update_lookup() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(2, 1))
        .unwrap();

    let fact = FactHandle::new(0, 2);
    director.before_problem_fact_added(fact);
    director.working_solution_mut().rooms.push(Room {
        id: "annex".to_string(),
    });
    director.after_problem_fact_added(fact).unwrap();
    assert_eq!(
        director
            .look_up_working_object("Room", &PlanningIdValue::from("annex"))
            .unwrap(),
        ObjectHandle::Fact(fact)
    );

    let renamed = ObjectHandle::Fact(FactHandle::new(0, 0));
    director.before_problem_property_changed(renamed);
    director.working_solution_mut().rooms[0].id = "lab".to_string();
    director.after_problem_property_changed(renamed).unwrap();
    assert_eq!(
        director
            .look_up_working_object_or_none("Room", &PlanningIdValue::from("room-0"))
            .unwrap(),
        None
    );
    assert_eq!(
        director
            .look_up_working_object("Room", &PlanningIdValue::from("lab"))
            .unwrap(),
        renamed
    );

    let removed = FactHandle::new(0, 1);
    director.before_problem_fact_removed(removed).unwrap();
    director.working_solution_mut().rooms.remove(1);
    director.after_problem_fact_removed(removed).unwrap();
    assert_eq!(
        director
            .look_up_working_object("Room", &PlanningIdValue::from("annex"))
            .unwrap(),
        ObjectHandle::Fact(FactHandle::new(0, 1))
    );
}

#[test]
fn test_problem_property_change_flushes_pending_shadows() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();

    slot_move(0, Some(2)).do_move(&mut director);
    let room = ObjectHandle::Fact(FactHandle::new(0, 0));
    director.before_problem_property_changed(room);
    director.after_problem_property_changed(room).unwrap();

    assert_eq!(director.working_solution().tasks[0].start, Some(20));
    assert_eq!(director.calculate_score().unwrap(), expected_schedule_score(&director));
}

fn optional_id_descriptor() -> SolutionDescriptor<Schedule> {
    SolutionDescriptor::builder("Schedule")
        .with_entity(
            EntityDescriptor::new("Task", |s: &Schedule| s.tasks.len())
                .with_planning_id(|s: &Schedule, i| {
                    (s.tasks[i].id >= 0).then(|| PlanningIdValue::Int(s.tasks[i].id))
                })
                .with_variable(VariableDescriptor::basic("slot", |s: &Schedule, i| {
                    s.tasks[i].slot.is_some()
                })),
        )
        .build()
        .unwrap()
}

#[test]
fn test_missing_planning_id_fails_fast() {
    let factory = ScoreDirectorFactory::easy(optional_id_descriptor(), calculate_schedule_score);
    let solution = Schedule::new(0, vec![Task::new(0, 5), Task::new(-1, 5)]);

    assert!(matches!(
        factory.build_score_director(solution.clone()),
        Err(PlanwrightError::MissingPlanningId { type_name: "Task", index: 1 })
    ));

    let director = factory
        .build_score_director_with(solution, false, false)
        .unwrap();
    assert!(matches!(
        director.assert_non_null_planning_ids(),
        Err(PlanwrightError::MissingPlanningId { .. })
    ));
}

#[test]
fn test_duplicate_planning_id_fails_fast() {
    let solution = Schedule::new(1, vec![Task::new(7, 5), Task::new(7, 6)]);

    assert!(matches!(
        schedule_factory().build_score_director(solution),
        Err(PlanwrightError::DuplicatePlanningId { .. })
    ));
}

#[test]
fn test_failed_set_keeps_previous_solution() {
    let mut director = schedule_factory()
        .build_score_director(Schedule::unassigned(1, 2))
        .unwrap();

    let broken = Schedule::new(1, vec![Task::new(3, 5), Task::new(3, 5)]);
    assert!(director.set_working_solution(broken).is_err());
    assert_eq!(director.working_solution().tasks.len(), 2);
    assert!(director
        .look_up_working_object("Task", &PlanningIdValue::Int(1))
        .is_ok());
}

// ============================================================================
// Constraint matches
// ============================================================================

#[test]
fn test_constraint_match_totals() {
    let factory = ScoreDirectorFactory::new(schedule_descriptor(), || {
        MatchingScoreCalculator::new(schedule_matches)
    })
    .with_constraint_match_enabled(true);
    let mut director = factory.build_score_director(Schedule::unassigned(1, 2)).unwrap();
    assign(&mut director, 0, 0, 0);
    assign(&mut director, 1, 0, 0);
    let score = director.calculate_score().unwrap();
    assert_eq!(score, HardSoftScore::of(-1, -11));

    let totals = director.constraint_match_totals().unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].constraint.name, "End time");
    assert_eq!(totals[0].match_count(), 2);
    assert_eq!(totals[1].constraint.name, "Room conflict");
    assert_eq!(totals[1].score, HardSoftScore::of(-1, 0));
}

#[test]
fn test_constraint_match_totals_require_constraint_matches() {
    let director = schedule_factory()
        .with_constraint_match_enabled(true)
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();

    // The easy calculator cannot produce matches.
    assert!(!director.is_constraint_match_enabled());
    assert!(matches!(
        director.constraint_match_totals(),
        Err(PlanwrightError::InvalidState(_))
    ));
}

// ============================================================================
// Factory
// ============================================================================

#[test]
fn test_assertion_factory_requires_asserted_mode() {
    let result = schedule_factory().with_assertion_factory(schedule_factory());

    assert!(matches!(result, Err(PlanwrightError::Config(_))));
}

#[test]
fn test_assertion_factory_cannot_nest() {
    let nested = schedule_factory()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_assertion_factory(schedule_factory())
        .unwrap();

    let result = schedule_factory()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_assertion_factory(nested);
    assert!(matches!(result, Err(PlanwrightError::Config(_))));
}

#[test]
fn test_environment_mode_sets_cloned_solution_assertion() {
    assert!(!schedule_factory().is_assert_cloned_solution());
    assert!(!schedule_factory()
        .with_environment_mode(EnvironmentMode::FastAssert)
        .is_assert_cloned_solution());
    assert!(schedule_factory()
        .with_environment_mode(EnvironmentMode::NonIntrusiveFullAssert)
        .is_assert_cloned_solution());
}

#[test]
fn test_factory_from_config() {
    let config = SolverConfig::new()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_score_director(ScoreDirectorConfig {
            constraint_match_enabled: true,
            lookup_enabled: false,
            assert_cloned_solution: Some(false),
        });

    let factory = ScoreDirectorFactory::from_config(&config, schedule_descriptor(), || {
        MatchingScoreCalculator::new(schedule_matches)
    })
    .unwrap();

    assert_eq!(factory.environment_mode(), EnvironmentMode::FullAssert);
    assert!(!factory.is_lookup_enabled());
    assert!(factory.is_constraint_match_enabled());
    assert!(!factory.is_assert_cloned_solution());
    let director = factory
        .build_score_director(Schedule::unassigned(1, 1))
        .unwrap();
    assert!(!director.is_lookup_enabled());
    assert!(director.is_constraint_match_enabled());
}

#[test]
fn test_factory_from_config_rejects_cloned_assertion_without_asserts() {
    let config = SolverConfig::new().with_score_director(ScoreDirectorConfig {
        assert_cloned_solution: Some(true),
        ..ScoreDirectorConfig::default()
    });

    let result = ScoreDirectorFactory::from_config(&config, schedule_descriptor(), || {
        MatchingScoreCalculator::new(schedule_matches)
    });
    assert!(matches!(result, Err(PlanwrightError::Config(_))));
}
