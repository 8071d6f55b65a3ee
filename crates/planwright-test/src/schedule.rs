//! Task scheduling fixtures with a dependent shadow variable chain.
//!
//! Each task has two basic variables (`room` and `slot`) and two shadow
//! variables: `start` is derived from `slot`, and `end` is derived from
//! `start`. The chain exercises the global listener order.
//!
//! Rooms are problem facts with text planning ids; tasks carry integer ids.

use std::collections::HashMap;

use planwright_core::domain::{
    EntityDescriptor, EntityHandle, ListenerContext, PlanningIdValue, PlanningSolution,
    ProblemFactDescriptor, ShadowValue, SolutionDescriptor, VariableDescriptor, VariableId,
    VariableListener,
};
use planwright_core::score::HardSoftScore;

/// Length of one time slot.
pub const SLOT_LENGTH: usize = 10;

pub const ROOM: VariableId = VariableId::new(0, 0);
pub const SLOT: VariableId = VariableId::new(0, 1);
pub const START: VariableId = VariableId::new(0, 2);
pub const END: VariableId = VariableId::new(0, 3);

/// A room, referenced by tasks through its position.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    pub id: String,
}

/// A task to place in a room and a time slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: i64,
    pub duration: usize,
    pub room: Option<usize>,
    pub slot: Option<usize>,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl Task {
    /// Creates an unassigned task.
    pub fn new(id: i64, duration: usize) -> Self {
        Self {
            id,
            duration,
            room: None,
            slot: None,
            start: None,
            end: None,
        }
    }

    /// Sets both genuine variables. Shadow variables are left for the listeners.
    pub fn assigned(mut self, room: usize, slot: usize) -> Self {
        self.room = Some(room);
        self.slot = Some(slot);
        self
    }
}

/// The scheduling solution.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    pub rooms: Vec<Room>,
    pub tasks: Vec<Task>,
    pub score: Option<HardSoftScore>,
}

impl Schedule {
    /// Creates a schedule with `room_count` rooms and the given tasks.
    pub fn new(room_count: usize, tasks: Vec<Task>) -> Self {
        let rooms = (0..room_count)
            .map(|i| Room {
                id: format!("room-{}", i),
            })
            .collect();
        Self {
            rooms,
            tasks,
            score: None,
        }
    }

    /// Creates a schedule of `task_count` unassigned tasks of increasing duration.
    pub fn unassigned(room_count: usize, task_count: usize) -> Self {
        let tasks = (0..task_count)
            .map(|i| Task::new(i as i64, 5 + i % 3))
            .collect();
        Self::new(room_count, tasks)
    }
}

impl PlanningSolution for Schedule {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Maintains `start = slot * SLOT_LENGTH`.
///
/// The faulty variant only reacts to reassignments: it skips tasks whose
/// slot was unassigned before the change, leaving `start` stale.
#[derive(Debug, Default)]
pub struct StartListener {
    faulty: bool,
    had_slot: HashMap<usize, bool>,
}

impl VariableListener<Schedule> for StartListener {
    fn before_variable_changed(&mut self, solution: &Schedule, entity: EntityHandle) {
        if self.faulty {
            let had_slot = solution
                .tasks
                .get(entity.index)
                .is_some_and(|t| t.slot.is_some());
            self.had_slot.insert(entity.index, had_slot);
        }
    }

    fn after_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, Schedule>,
        entity: EntityHandle,
    ) {
        if self.faulty && !self.had_slot.remove(&entity.index).unwrap_or(true) {
            return;
        }
        let Some(task) = ctx.solution().tasks.get(entity.index) else {
            return;
        };
        let start = task.slot.map(|slot| slot * SLOT_LENGTH);
        if task.start != start {
            ctx.change_variable(START, entity, |s| s.tasks[entity.index].start = start);
        }
    }

    fn reset_working_solution(&mut self, _solution: &Schedule) {
        self.had_slot.clear();
    }
}

/// Maintains `end = start + duration`.
#[derive(Debug, Default)]
pub struct EndListener;

impl VariableListener<Schedule> for EndListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, Schedule>,
        entity: EntityHandle,
    ) {
        let Some(task) = ctx.solution().tasks.get(entity.index) else {
            return;
        };
        let end = task.start.map(|start| start + task.duration);
        if task.end != end {
            ctx.change_variable(END, entity, |s| s.tasks[entity.index].end = end);
        }
    }

    fn requires_unique_entity_events(&self) -> bool {
        true
    }
}

fn start_value(s: &Schedule, i: usize) -> Box<dyn ShadowValue> {
    Box::new(s.tasks[i].start)
}

fn end_value(s: &Schedule, i: usize) -> Box<dyn ShadowValue> {
    Box::new(s.tasks[i].end)
}

fn describe(faulty: bool) -> SolutionDescriptor<Schedule> {
    SolutionDescriptor::builder("Schedule")
        .with_problem_fact(
            ProblemFactDescriptor::new("Room", |s: &Schedule| s.rooms.len()).with_planning_id(
                |s: &Schedule, i| Some(PlanningIdValue::Text(s.rooms[i].id.clone())),
            ),
        )
        .with_entity(
            EntityDescriptor::new("Task", |s: &Schedule| s.tasks.len())
                .with_planning_id(|s: &Schedule, i| Some(PlanningIdValue::Int(s.tasks[i].id)))
                .with_identity(|s: &Schedule, i| &s.tasks[i] as *const Task as usize)
                .with_variable(VariableDescriptor::basic("room", |s: &Schedule, i| {
                    s.tasks[i].room.is_some()
                }))
                .with_variable(VariableDescriptor::basic("slot", |s: &Schedule, i| {
                    s.tasks[i].slot.is_some()
                }))
                .with_variable(
                    VariableDescriptor::shadow("start", start_value)
                        .with_source("Task", "slot")
                        .with_listener(move || StartListener {
                            faulty,
                            had_slot: HashMap::new(),
                        }),
                )
                .with_variable(
                    VariableDescriptor::shadow("end", end_value)
                        .with_source("Task", "start")
                        .with_listener(|| EndListener),
                ),
        )
        .build()
        .expect("the schedule descriptor is valid")
}

/// Describes [`Schedule`] with correct listeners.
pub fn schedule_descriptor() -> SolutionDescriptor<Schedule> {
    describe(false)
}

/// Describes [`Schedule`] with a start listener that misses first assignments.
pub fn faulty_schedule_descriptor() -> SolutionDescriptor<Schedule> {
    describe(true)
}

/// Pairs of tasks in the same room whose `[start, end)` intervals overlap.
pub fn room_conflicts(solution: &Schedule) -> Vec<(usize, usize)> {
    let tasks = &solution.tasks;
    let mut conflicts = Vec::new();
    for i in 0..tasks.len() {
        for j in (i + 1)..tasks.len() {
            let (a, b) = (&tasks[i], &tasks[j]);
            let same_room = a.room.is_some() && a.room == b.room;
            if let (true, Some(a_start), Some(a_end), Some(b_start), Some(b_end)) =
                (same_room, a.start, a.end, b.start, b.end)
            {
                if a_start < b_end && b_start < a_end {
                    conflicts.push((i, j));
                }
            }
        }
    }
    conflicts
}

/// Soft penalty per task: its end time.
pub fn end_penalties(solution: &Schedule) -> Vec<(usize, i64)> {
    solution
        .tasks
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.end.map(|end| (i, end as i64)))
        .collect()
}

/// Score of a schedule computed from scratch, with a zero init score.
pub fn calculate_schedule_score(solution: &Schedule) -> HardSoftScore {
    let hard = room_conflicts(solution).len() as i64;
    let soft: i64 = end_penalties(solution).iter().map(|(_, end)| end).sum();
    HardSoftScore::of(-hard, -soft)
}
