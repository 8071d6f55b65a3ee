//! Solver handle for submitting problem changes during solving.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use planwright_core::domain::PlanningSolution;
use planwright_core::Result;
use planwright_scoring::ScoreDirector;
use tracing::debug;

use super::problem_change::BoxedProblemChange;
use super::ProblemChange;

/// Result of a problem change submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemChangeResult {
    /// Change was successfully queued.
    Queued,
    /// Solver is not running, change was not queued.
    SolverNotRunning,
    /// The receiving side is gone.
    Disconnected,
}

/// Handle for interacting with a running solver.
///
/// A submitted change counts as in flight from the moment it is queued until
/// the solver thread has applied it. A best solution may only be published
/// while nothing is in flight.
///
/// # Example
///
/// ```
/// use planwright_solver::realtime::{ClosureProblemChange, ProblemChangeResult, SolverHandle};
/// use planwright_test::schedule::Schedule;
///
/// let (handle, receiver) = SolverHandle::<Schedule>::new();
///
/// handle.set_solving(true);
/// let change = ClosureProblemChange::<Schedule, _>::new("noop", |_| Ok(()));
/// assert_eq!(handle.add_problem_change(change), ProblemChangeResult::Queued);
/// assert!(!handle.is_every_problem_change_processed());
///
/// assert_eq!(receiver.drain_pending().len(), 1);
/// receiver.mark_processed(1);
/// assert!(handle.is_every_problem_change_processed());
///
/// handle.set_solving(false);
/// let change = ClosureProblemChange::<Schedule, _>::new("late", |_| Ok(()));
/// assert_eq!(handle.add_problem_change(change), ProblemChangeResult::SolverNotRunning);
/// ```
pub struct SolverHandle<S: PlanningSolution> {
    change_tx: Sender<BoxedProblemChange<S>>,
    in_flight: Arc<AtomicUsize>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
}

impl<S: PlanningSolution> SolverHandle<S> {
    /// Creates a new solver handle and its corresponding receiver.
    ///
    /// The receiver should be passed to the solver to receive changes.
    pub fn new() -> (Self, ProblemChangeReceiver<S>) {
        let (tx, rx) = channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let solving = Arc::new(AtomicBool::new(false));
        let terminate_early = Arc::new(AtomicBool::new(false));

        let handle = Self {
            change_tx: tx,
            in_flight: Arc::clone(&in_flight),
            solving: Arc::clone(&solving),
            terminate_early: Arc::clone(&terminate_early),
        };

        let receiver = ProblemChangeReceiver {
            change_rx: rx,
            in_flight,
            solving,
            terminate_early,
        };

        (handle, receiver)
    }

    /// Submits a problem change to the solver.
    pub fn add_problem_change<P: ProblemChange<S> + 'static>(
        &self,
        change: P,
    ) -> ProblemChangeResult {
        self.add_problem_change_boxed(Box::new(change))
    }

    /// Submits a boxed problem change to the solver.
    pub fn add_problem_change_boxed(&self, change: BoxedProblemChange<S>) -> ProblemChangeResult {
        if !self.solving.load(Ordering::SeqCst) {
            return ProblemChangeResult::SolverNotRunning;
        }

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        match self.change_tx.send(change) {
            Ok(()) => ProblemChangeResult::Queued,
            Err(_) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                ProblemChangeResult::Disconnected
            }
        }
    }

    /// Returns true when no submitted change still waits to be applied.
    pub fn is_every_problem_change_processed(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) == 0
    }

    /// Returns true if the solver is currently running.
    pub fn is_solving(&self) -> bool {
        self.solving.load(Ordering::SeqCst)
    }

    /// Requests early termination of the solver.
    pub fn terminate_early(&self) {
        self.terminate_early.store(true, Ordering::SeqCst);
    }

    pub fn is_terminate_early_requested(&self) -> bool {
        self.terminate_early.load(Ordering::SeqCst)
    }

    /// Sets the solving flag (used internally by the solver).
    pub fn set_solving(&self, solving: bool) {
        self.solving.store(solving, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> Clone for SolverHandle<S> {
    fn clone(&self) -> Self {
        Self {
            change_tx: self.change_tx.clone(),
            in_flight: Arc::clone(&self.in_flight),
            solving: Arc::clone(&self.solving),
            terminate_early: Arc::clone(&self.terminate_early),
        }
    }
}

impl<S: PlanningSolution> Debug for SolverHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverHandle")
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .field("terminate_early", &self.terminate_early.load(Ordering::SeqCst))
            .finish()
    }
}

/// Receiver for problem changes, used by the solver.
pub struct ProblemChangeReceiver<S: PlanningSolution> {
    change_rx: Receiver<BoxedProblemChange<S>>,
    in_flight: Arc<AtomicUsize>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
}

impl<S: PlanningSolution> ProblemChangeReceiver<S> {
    /// Tries to receive a pending problem change without blocking.
    pub fn try_recv(&self) -> Option<BoxedProblemChange<S>> {
        self.change_rx.try_recv().ok()
    }

    /// Receives all pending problem changes without blocking.
    ///
    /// The drained changes stay in flight until [`mark_processed`](Self::mark_processed).
    pub fn drain_pending(&self) -> Vec<BoxedProblemChange<S>> {
        self.change_rx.try_iter().collect()
    }

    /// Marks `count` drained changes as applied.
    pub fn mark_processed(&self, count: usize) {
        if count > 0 {
            self.in_flight.fetch_sub(count, Ordering::SeqCst);
        }
    }

    /// Returns true if a submitted change waits in the queue.
    pub fn has_pending(&self) -> bool {
        !self.change_rx.is_empty()
    }

    /// Applies every pending change through `director` and returns how many were applied.
    ///
    /// After the batch, every fact and entity of a type with planning ids
    /// must still have one. The first failing change aborts the batch. Every
    /// drained change is marked processed either way.
    pub fn process_pending(&self, director: &mut dyn ScoreDirector<S>) -> Result<usize> {
        let changes = self.drain_pending();
        if changes.is_empty() {
            return Ok(0);
        }

        let mut outcome = Ok(());
        for change in &changes {
            debug!(event = "apply_problem_change", change = ?change);
            if let Err(e) = change.apply(director) {
                outcome = Err(e);
                break;
            }
        }
        if outcome.is_ok() {
            director.trigger_variable_listeners();
            outcome = director
                .assert_non_null_planning_ids()
                .and_then(|()| director.calculate_score().map(|_| ()));
        }
        self.mark_processed(changes.len());
        outcome.map(|()| changes.len())
    }

    pub fn is_every_problem_change_processed(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) == 0
    }

    /// Returns true if early termination has been requested.
    pub fn is_terminate_early_requested(&self) -> bool {
        self.terminate_early.load(Ordering::SeqCst)
    }

    /// Sets the solving flag.
    pub fn set_solving(&self, solving: bool) {
        self.solving.store(solving, Ordering::SeqCst);
    }

    /// Clears the terminate early flag.
    pub fn clear_terminate_early(&self) {
        self.terminate_early.store(false, Ordering::SeqCst);
    }

    /// The shared terminate early flag, for [`ExternalTermination`](crate::termination::ExternalTermination).
    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early)
    }
}

impl<S: PlanningSolution> Debug for ProblemChangeReceiver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemChangeReceiver")
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .finish()
    }
}
