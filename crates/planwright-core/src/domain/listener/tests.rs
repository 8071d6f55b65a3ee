//! Tests for variable listener infrastructure

use super::*;
use crate::domain::{
    EntityDescriptor, EntityHandle, ShadowValue, SolutionDescriptor, VariableDescriptor, VariableId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
struct Task {
    slot: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
}

#[derive(Clone, Debug, Default)]
struct Route {
    visits: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
struct TestSolution {
    tasks: Vec<Task>,
    routes: Vec<Route>,
    customer_route: Vec<Option<usize>>,
}

const SLOT: VariableId = VariableId::new(0, 0);
const START: VariableId = VariableId::new(0, 1);
const END: VariableId = VariableId::new(0, 2);
const VISITS: VariableId = VariableId::new(1, 0);
const INVERSE: VariableId = VariableId::new(1, 1);

/// start = slot * 10
struct StartListener {
    after_count: Arc<AtomicUsize>,
    unique: bool,
}

impl VariableListener<TestSolution> for StartListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, TestSolution>,
        entity: EntityHandle,
    ) {
        self.after_count.fetch_add(1, Ordering::SeqCst);
        let start = ctx.solution().tasks[entity.index].slot.map(|slot| slot * 10);
        if ctx.solution().tasks[entity.index].start != start {
            ctx.change_variable(START, entity, |s| s.tasks[entity.index].start = start);
        }
    }

    fn requires_unique_entity_events(&self) -> bool {
        self.unique
    }
}

/// end = start + 5
struct EndListener;

impl VariableListener<TestSolution> for EndListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, TestSolution>,
        entity: EntityHandle,
    ) {
        let end = ctx.solution().tasks[entity.index].start.map(|start| start + 5);
        if ctx.solution().tasks[entity.index].end != end {
            ctx.change_variable(END, entity, |s| s.tasks[entity.index].end = end);
        }
    }
}

/// Maintains `customer_route` from the route lists.
struct InverseListener {
    unassigned: Arc<AtomicUsize>,
}

impl VariableListener<TestSolution> for InverseListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, TestSolution>,
        entity: EntityHandle,
    ) {
        let visits = ctx.solution().routes[entity.index].visits.clone();
        for customer in visits {
            ctx.change_variable(INVERSE, entity, |s| {
                s.customer_route[customer] = Some(entity.index)
            });
        }
    }

    fn after_list_element_unassigned(
        &mut self,
        ctx: &mut ListenerContext<'_, TestSolution>,
        element: usize,
    ) {
        self.unassigned.fetch_add(1, Ordering::SeqCst);
        ctx.solution_mut().customer_route[element] = None;
    }
}

#[derive(Default)]
struct RecordingObserver {
    before: Vec<(VariableId, EntityHandle)>,
    after: Vec<(VariableId, EntityHandle)>,
}

impl VariableChangeObserver<TestSolution> for RecordingObserver {
    fn before_variable_changed(
        &mut self,
        _: &TestSolution,
        variable: VariableId,
        entity: EntityHandle,
    ) {
        self.before.push((variable, entity));
    }

    fn after_variable_changed(
        &mut self,
        _: &TestSolution,
        variable: VariableId,
        entity: EntityHandle,
    ) {
        self.after.push((variable, entity));
    }
}

fn start_value(s: &TestSolution, i: usize) -> Box<dyn ShadowValue> {
    Box::new(s.tasks[i].start)
}

fn end_value(s: &TestSolution, i: usize) -> Box<dyn ShadowValue> {
    Box::new(s.tasks[i].end)
}

fn inverse_value(s: &TestSolution, i: usize) -> Box<dyn ShadowValue> {
    Box::new(
        s.customer_route
            .iter()
            .filter(|r| **r == Some(i))
            .count(),
    )
}

fn descriptor(
    after_count: Arc<AtomicUsize>,
    unique: bool,
    unassigned: Arc<AtomicUsize>,
) -> SolutionDescriptor<TestSolution> {
    SolutionDescriptor::builder("TestSolution")
        .with_entity(
            EntityDescriptor::new("Task", |s: &TestSolution| s.tasks.len())
                .with_variable(VariableDescriptor::basic("slot", |s: &TestSolution, i| {
                    s.tasks[i].slot.is_some()
                }))
                .with_variable(
                    VariableDescriptor::shadow("start", start_value)
                        .with_source("Task", "slot")
                        .with_listener(move || StartListener {
                            after_count: after_count.clone(),
                            unique,
                        }),
                )
                .with_variable(
                    VariableDescriptor::shadow("end", end_value)
                        .with_source("Task", "start")
                        .with_listener(|| EndListener),
                ),
        )
        .with_entity(
            EntityDescriptor::new("Route", |s: &TestSolution| s.routes.len())
                .with_variable(VariableDescriptor::list(
                    "visits",
                    |s: &TestSolution, i| s.routes[i].visits.len(),
                    |s: &TestSolution| s.customer_route.len(),
                ))
                .with_variable(
                    VariableDescriptor::shadow("inverse", inverse_value)
                        .with_source("Route", "visits")
                        .with_listener(move || InverseListener {
                            unassigned: unassigned.clone(),
                        }),
                ),
        )
        .build()
        .unwrap()
}

fn default_descriptor() -> SolutionDescriptor<TestSolution> {
    descriptor(
        Arc::new(AtomicUsize::new(0)),
        false,
        Arc::new(AtomicUsize::new(0)),
    )
}

fn two_tasks() -> TestSolution {
    TestSolution {
        tasks: vec![Task::default(), Task::default()],
        routes: vec![Route::default()],
        customer_route: vec![None, None],
    }
}

#[test]
fn test_link_creates_listener_per_shadow() {
    let descriptor = default_descriptor();
    let support = VariableListenerSupport::link(&descriptor);

    assert_eq!(support.listener_count(), 3);
    assert!(!support.has_pending_notifications());
}

#[test]
fn test_change_propagates_through_chain() {
    let descriptor = default_descriptor();
    let mut support = VariableListenerSupport::link(&descriptor);
    let mut solution = two_tasks();
    let mut observer = RecordingObserver::default();
    let task = EntityHandle::new(0, 1);

    support.before_variable_changed(&solution, SLOT, task);
    solution.tasks[1].slot = Some(2);
    support.trigger_variable_listeners_in_notification_queues(&mut solution, &mut observer);

    assert_eq!(solution.tasks[1].start, Some(20));
    assert_eq!(solution.tasks[1].end, Some(25));
    assert_eq!(solution.tasks[0].start, None);
    // The calculator sees start before end.
    assert_eq!(observer.after, vec![(START, task), (END, task)]);
    assert_eq!(observer.before, observer.after);
    assert!(support.assert_notification_queues_are_empty().is_ok());
}

#[test]
fn test_pending_notifications_are_reported() {
    let descriptor = default_descriptor();
    let mut support = VariableListenerSupport::link(&descriptor);
    let solution = two_tasks();

    support.before_variable_changed(&solution, SLOT, EntityHandle::new(0, 0));

    assert!(support.has_pending_notifications());
    assert!(support.assert_notification_queues_are_empty().is_err());
}

#[test]
fn test_unrelated_variable_queues_nothing() {
    let descriptor = default_descriptor();
    let mut support = VariableListenerSupport::link(&descriptor);
    let solution = two_tasks();

    // Shadow variables with no dependents are not sources.
    support.before_variable_changed(&solution, END, EntityHandle::new(0, 0));

    assert!(!support.has_pending_notifications());
}

#[test]
fn test_unique_entity_events_are_deduplicated() {
    let after_count = Arc::new(AtomicUsize::new(0));
    let descriptor = descriptor(after_count.clone(), true, Arc::new(AtomicUsize::new(0)));
    let mut support = VariableListenerSupport::link(&descriptor);
    let mut solution = two_tasks();
    let task = EntityHandle::new(0, 0);

    support.before_variable_changed(&solution, SLOT, task);
    support.before_variable_changed(&solution, SLOT, task);
    solution.tasks[0].slot = Some(1);
    support.trigger_variable_listeners_in_notification_queues(&mut solution, &mut NoopObserver);

    assert_eq!(after_count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_events_are_kept_without_uniqueness() {
    let after_count = Arc::new(AtomicUsize::new(0));
    let descriptor = descriptor(after_count.clone(), false, Arc::new(AtomicUsize::new(0)));
    let mut support = VariableListenerSupport::link(&descriptor);
    let mut solution = two_tasks();
    let task = EntityHandle::new(0, 0);

    support.before_variable_changed(&solution, SLOT, task);
    support.before_variable_changed(&solution, SLOT, task);
    support.trigger_variable_listeners_in_notification_queues(&mut solution, &mut NoopObserver);

    assert_eq!(after_count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_entity_added_notifies_listeners_of_that_type() {
    let after_count = Arc::new(AtomicUsize::new(0));
    let descriptor = descriptor(after_count.clone(), false, Arc::new(AtomicUsize::new(0)));
    let mut support = VariableListenerSupport::link(&descriptor);
    let mut solution = two_tasks();
    solution.tasks.push(Task {
        slot: Some(4),
        ..Task::default()
    });
    let added = EntityHandle::new(0, 2);

    support.before_entity_added(&solution, added);
    support.trigger_variable_listeners_in_notification_queues(&mut solution, &mut NoopObserver);

    assert_eq!(after_count.load(Ordering::SeqCst), 1);
    assert_eq!(solution.tasks[2].end, Some(45));
}

#[test]
fn test_list_change_and_unassigned_element() {
    let unassigned = Arc::new(AtomicUsize::new(0));
    let descriptor = descriptor(Arc::new(AtomicUsize::new(0)), false, unassigned.clone());
    let mut support = VariableListenerSupport::link(&descriptor);
    let mut solution = two_tasks();
    let route = EntityHandle::new(1, 0);

    support.before_list_variable_changed(&solution, VISITS, route, 0, 0);
    solution.routes[0].visits = vec![1, 0];
    support.after_list_variable_changed(VISITS, route, 0, 2);
    support.trigger_variable_listeners_in_notification_queues(&mut solution, &mut NoopObserver);
    assert_eq!(solution.customer_route, vec![Some(0), Some(0)]);

    support.before_list_variable_changed(&solution, VISITS, route, 0, 1);
    solution.routes[0].visits.remove(0);
    support.after_list_variable_changed(VISITS, route, 0, 0);
    support.after_list_element_unassigned(VISITS, 1);
    support.trigger_variable_listeners_in_notification_queues(&mut solution, &mut NoopObserver);

    assert_eq!(unassigned.load(Ordering::SeqCst), 1);
    assert_eq!(solution.customer_route, vec![Some(0), None]);
}

#[test]
fn test_force_trigger_repairs_stale_shadows() {
    let descriptor = default_descriptor();
    let mut support = VariableListenerSupport::link(&descriptor);
    let mut solution = TestSolution {
        tasks: vec![
            Task {
                slot: Some(1),
                start: Some(99),
                end: None,
            },
            Task {
                slot: Some(3),
                ..Task::default()
            },
        ],
        routes: vec![Route { visits: vec![0] }],
        customer_route: vec![None],
    };

    support.force_trigger_all_variable_listeners(&descriptor, &mut solution, &mut NoopObserver);

    assert_eq!(solution.tasks[0].start, Some(10));
    assert_eq!(solution.tasks[0].end, Some(15));
    assert_eq!(solution.tasks[1].end, Some(35));
    assert_eq!(solution.customer_route, vec![Some(0)]);
    assert!(!support.has_pending_notifications());
}

#[test]
fn test_reset_drops_queued_notifications() {
    let after_count = Arc::new(AtomicUsize::new(0));
    let descriptor = descriptor(after_count.clone(), false, Arc::new(AtomicUsize::new(0)));
    let mut support = VariableListenerSupport::link(&descriptor);
    let mut solution = two_tasks();

    support.before_variable_changed(&solution, SLOT, EntityHandle::new(0, 0));
    support.reset_working_solution(&solution);
    support.trigger_variable_listeners_in_notification_queues(&mut solution, &mut NoopObserver);

    assert_eq!(after_count.load(Ordering::SeqCst), 0);
    assert!(support.assert_notification_queues_are_empty().is_ok());
}

#[test]
fn test_requires_unique_entity_events_default() {
    assert!(!EndListener.requires_unique_entity_events());
}

struct ClosingListener {
    closed: Arc<AtomicUsize>,
}

impl VariableListener<TestSolution> for ClosingListener {
    fn after_variable_changed(&mut self, _: &mut ListenerContext<'_, TestSolution>, _: EntityHandle) {}

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_close_runs_once_and_on_drop() {
    let closed = Arc::new(AtomicUsize::new(0));
    let counter = closed.clone();
    let descriptor = SolutionDescriptor::builder("TestSolution")
        .with_entity(
            EntityDescriptor::new("Task", |s: &TestSolution| s.tasks.len())
                .with_variable(VariableDescriptor::basic("slot", |s: &TestSolution, i| {
                    s.tasks[i].slot.is_some()
                }))
                .with_variable(
                    VariableDescriptor::shadow("start", start_value)
                        .with_source("Task", "slot")
                        .with_listener(move || ClosingListener {
                            closed: counter.clone(),
                        }),
                ),
        )
        .build()
        .unwrap();

    let mut support = VariableListenerSupport::link(&descriptor);
    support.close();
    support.close();
    assert_eq!(closed.load(Ordering::SeqCst), 1);

    support.reset_working_solution(&two_tasks());
    drop(support);
    assert_eq!(closed.load(Ordering::SeqCst), 2);
}
