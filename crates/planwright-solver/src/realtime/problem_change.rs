//! Problem change trait for real-time planning.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use planwright_core::domain::PlanningSolution;
use planwright_core::Result;
use planwright_scoring::ScoreDirector;

/// A live edit of the problem, applied on the solver thread while solving.
///
/// Every mutation must go through the before/after hooks of the score
/// director, so the init score, the shadow variables and the working-object
/// lookup stay consistent with the edited solution.
///
/// # Example
///
/// ```
/// use planwright_core::domain::{EntityHandle, PlanningSolution};
/// use planwright_core::Result;
/// use planwright_scoring::ScoreDirector;
/// use planwright_solver::realtime::ProblemChange;
/// use planwright_test::schedule::{Schedule, Task};
///
/// /// Adds an unassigned task.
/// #[derive(Debug)]
/// struct AddTask { id: i64 }
///
/// impl ProblemChange<Schedule> for AddTask {
///     fn apply(&self, director: &mut dyn ScoreDirector<Schedule>) -> Result<()> {
///         let index = director.working_solution().tasks.len();
///         let handle = EntityHandle::new(0, index);
///         director.before_entity_added(handle);
///         director.working_solution_mut().tasks.push(Task::new(self.id, 3));
///         director.after_entity_added(handle)?;
///         director.trigger_variable_listeners();
///         Ok(())
///     }
/// }
/// ```
pub trait ProblemChange<S: PlanningSolution>: Send + Debug {
    /// Applies this change to the working solution.
    fn apply(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()>;
}

/// A boxed problem change for type-erased storage.
pub type BoxedProblemChange<S> = Box<dyn ProblemChange<S>>;

impl<S: PlanningSolution> ProblemChange<S> for BoxedProblemChange<S> {
    fn apply(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        (**self).apply(score_director)
    }
}

/// A problem change implemented as a closure.
///
/// ```
/// use planwright_solver::realtime::ClosureProblemChange;
/// use planwright_test::schedule::Schedule;
///
/// let change = ClosureProblemChange::<Schedule, _>::new("rename room", |director| {
///     director.working_solution_mut().rooms[0].id = "atrium".to_string();
///     Ok(())
/// });
/// ```
pub struct ClosureProblemChange<S: PlanningSolution, F>
where
    F: Fn(&mut dyn ScoreDirector<S>) -> Result<()> + Send,
{
    name: &'static str,
    change_fn: F,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, F> ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut dyn ScoreDirector<S>) -> Result<()> + Send,
{
    /// Creates a closure-based problem change; `name` is only used for debugging.
    pub fn new(name: &'static str, change_fn: F) -> Self {
        Self {
            name,
            change_fn,
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<S, F> Debug for ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut dyn ScoreDirector<S>) -> Result<()> + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureProblemChange")
            .field("name", &self.name)
            .finish()
    }
}

impl<S, F> ProblemChange<S> for ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut dyn ScoreDirector<S>) -> Result<()> + Send,
{
    fn apply(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        (self.change_fn)(score_director)
    }
}
