//! Vehicle routing fixtures with a list variable.
//!
//! Every vehicle owns a list of customer positions. Each customer carries an
//! inverse shadow variable naming the vehicle that visits it, maintained
//! from list range and element notifications.

use planwright_core::domain::{
    EntityDescriptor, EntityHandle, ListenerContext, PlanningIdValue, PlanningSolution,
    ShadowValue, SolutionDescriptor, VariableDescriptor, VariableId, VariableListener,
};
use planwright_core::score::SimpleScore;

pub const VISITS: VariableId = VariableId::new(0, 0);
pub const VEHICLE: VariableId = VariableId::new(1, 0);

/// Descriptor index of the `Customer` entity type.
pub const CUSTOMER_DESCRIPTOR: usize = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id: i64,
    pub visits: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub vehicle: Option<usize>,
}

/// The routing solution.
#[derive(Clone, Debug, PartialEq)]
pub struct Routing {
    pub vehicles: Vec<Vehicle>,
    pub customers: Vec<Customer>,
    pub score: Option<SimpleScore>,
}

impl Routing {
    /// Creates a routing problem with empty routes.
    pub fn new(vehicle_count: usize, customer_count: usize) -> Self {
        Self {
            vehicles: (0..vehicle_count)
                .map(|i| Vehicle {
                    id: i as i64,
                    visits: Vec::new(),
                })
                .collect(),
            customers: (0..customer_count)
                .map(|i| Customer {
                    id: 100 + i as i64,
                    vehicle: None,
                })
                .collect(),
            score: None,
        }
    }

    /// Customers that no vehicle visits.
    pub fn unassigned_customers(&self) -> Vec<usize> {
        (0..self.customers.len())
            .filter(|c| !self.vehicles.iter().any(|v| v.visits.contains(c)))
            .collect()
    }
}

impl PlanningSolution for Routing {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Keeps `Customer::vehicle` in sync with the route lists.
#[derive(Debug, Default)]
pub struct InverseVehicleListener;

impl InverseVehicleListener {
    fn assign(ctx: &mut ListenerContext<'_, Routing>, customer: usize, vehicle: Option<usize>) {
        if ctx.solution().customers[customer].vehicle != vehicle {
            let handle = EntityHandle::new(CUSTOMER_DESCRIPTOR, customer);
            ctx.change_variable(VEHICLE, handle, |s| s.customers[customer].vehicle = vehicle);
        }
    }
}

impl VariableListener<Routing> for InverseVehicleListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, Routing>,
        entity: EntityHandle,
    ) {
        let len = ctx.solution().vehicles[entity.index].visits.len();
        self.after_list_variable_changed(ctx, entity, 0, len);
    }

    fn after_list_variable_changed(
        &mut self,
        ctx: &mut ListenerContext<'_, Routing>,
        entity: EntityHandle,
        from_index: usize,
        to_index: usize,
    ) {
        let visits = &ctx.solution().vehicles[entity.index].visits;
        let end = to_index.min(visits.len());
        let changed: Vec<usize> = visits[from_index.min(end)..end].to_vec();
        for customer in changed {
            Self::assign(ctx, customer, Some(entity.index));
        }
    }

    fn after_list_element_unassigned(
        &mut self,
        ctx: &mut ListenerContext<'_, Routing>,
        element: usize,
    ) {
        Self::assign(ctx, element, None);
    }
}

fn vehicle_value(s: &Routing, i: usize) -> Box<dyn ShadowValue> {
    Box::new(s.customers[i].vehicle)
}

fn describe(allows_unassigned_values: bool) -> SolutionDescriptor<Routing> {
    SolutionDescriptor::builder("Routing")
        .with_entity(
            EntityDescriptor::new("Vehicle", |s: &Routing| s.vehicles.len())
                .with_planning_id(|s: &Routing, i| Some(PlanningIdValue::Int(s.vehicles[i].id)))
                .with_variable(
                    VariableDescriptor::list(
                        "visits",
                        |s: &Routing, i| s.vehicles[i].visits.len(),
                        |s: &Routing| s.customers.len(),
                    )
                    .with_allows_unassigned(allows_unassigned_values),
                ),
        )
        .with_entity(
            EntityDescriptor::new("Customer", |s: &Routing| s.customers.len())
                .with_planning_id(|s: &Routing, i| Some(PlanningIdValue::Int(s.customers[i].id)))
                .with_variable(
                    VariableDescriptor::shadow("vehicle", vehicle_value)
                        .with_source("Vehicle", "visits")
                        .with_listener(|| InverseVehicleListener),
                ),
        )
        .build()
        .expect("the routing descriptor is valid")
}

/// Describes [`Routing`]; every customer must end up in a route.
pub fn routing_descriptor() -> SolutionDescriptor<Routing> {
    describe(false)
}

/// Describes [`Routing`] where customers may stay unvisited.
pub fn optional_routing_descriptor() -> SolutionDescriptor<Routing> {
    describe(true)
}

/// Penalizes unbalanced routes: the sum of squared route lengths.
pub fn calculate_routing_score(solution: &Routing) -> SimpleScore {
    let load: i64 = solution
        .vehicles
        .iter()
        .map(|v| (v.visits.len() * v.visits.len()) as i64)
        .sum();
    SimpleScore::of(-load)
}

/// Inserts `customer` into the route of `vehicle` at `index`.
pub fn insert_visit(s: &mut Routing, vehicle: usize, index: usize, customer: usize) {
    s.vehicles[vehicle].visits.insert(index, customer);
}

/// Removes and returns the customer at `index` of the route of `vehicle`.
pub fn remove_visit(s: &mut Routing, vehicle: usize, index: usize) -> usize {
    s.vehicles[vehicle].visits.remove(index)
}

/// Length of the route of `vehicle`.
pub fn route_len(s: &Routing, vehicle: usize) -> usize {
    s.vehicles[vehicle].visits.len()
}

/// Customer at `index` of the route of `vehicle`.
pub fn visit_at(s: &Routing, vehicle: usize, index: usize) -> usize {
    s.vehicles[vehicle].visits[index]
}
