//! Delivery of best solutions to user callbacks.
//!
//! All callbacks of one job run on a single dedicated worker thread, never on
//! the solver thread and never concurrently with each other. A single-permit
//! gate keeps at most one delivery scheduled or running; a delivery re-checks
//! the holder after releasing its permit, so a best solution published while
//! it was running is never lost.

use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use planwright_core::domain::PlanningSolution;
use planwright_core::{PlanwrightError, Result};
use tracing::{debug, error, warn};

use super::best_solution_holder::{BestSolutionHolder, VersionedBestSolution};
use super::solver_handle::SolverHandle;
use crate::error::{BoxError, ConsumerError, ProblemChangeError, SolverJobError};

/// Receives every intermediate best solution.
pub type BestSolutionConsumer<S> = Box<dyn FnMut(S) -> std::result::Result<(), BoxError> + Send>;

/// Receives the final best solution once.
pub type FinalBestSolutionConsumer<S> =
    Box<dyn FnOnce(S) -> std::result::Result<(), BoxError> + Send>;

/// Called with the problem id when a consumer or the search fails.
pub type ExceptionHandler<I> = Box<dyn Fn(&I, &ConsumerError) + Send>;

/// The callbacks registered for one solver job.
pub struct BestSolutionConsumers<S, I> {
    intermediate: Option<BestSolutionConsumer<S>>,
    final_consumer: Option<FinalBestSolutionConsumer<S>>,
    exception_handler: Option<ExceptionHandler<I>>,
}

impl<S, I> BestSolutionConsumers<S, I> {
    pub fn new() -> Self {
        Self {
            intermediate: None,
            final_consumer: None,
            exception_handler: None,
        }
    }

    pub fn with_intermediate<F>(mut self, consumer: F) -> Self
    where
        F: FnMut(S) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        self.intermediate = Some(Box::new(consumer));
        self
    }

    pub fn with_final<F>(mut self, consumer: F) -> Self
    where
        F: FnOnce(S) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        self.final_consumer = Some(Box::new(consumer));
        self
    }

    pub fn with_exception_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&I, &ConsumerError) + Send + 'static,
    {
        self.exception_handler = Some(Box::new(handler));
        self
    }

    pub fn has_intermediate(&self) -> bool {
        self.intermediate.is_some()
    }
}

impl<S, I> Default for BestSolutionConsumers<S, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, I> Debug for BestSolutionConsumers<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BestSolutionConsumers")
            .field("intermediate", &self.intermediate.is_some())
            .field("final", &self.final_consumer.is_some())
            .field("exception_handler", &self.exception_handler.is_some())
            .finish()
    }
}

/// Binary semaphore guarding active consumption.
#[derive(Default)]
struct ConsumptionGate {
    busy: Mutex<bool>,
    released: Condvar,
}

impl ConsumptionGate {
    fn try_acquire(self: &Arc<Self>) -> Option<GatePermit> {
        let mut busy = self.busy.lock();
        if *busy {
            return None;
        }
        *busy = true;
        Some(GatePermit {
            gate: Arc::clone(self),
        })
    }

    fn acquire(self: &Arc<Self>) -> GatePermit {
        let mut busy = self.busy.lock();
        while *busy {
            self.released.wait(&mut busy);
        }
        *busy = true;
        GatePermit {
            gate: Arc::clone(self),
        }
    }

    fn release(&self) {
        *self.busy.lock() = false;
        self.released.notify_all();
    }
}

/// Releases the gate when dropped, including on unwinding or a failed send.
struct GatePermit {
    gate: Arc<ConsumptionGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}

enum Delivery<S> {
    Intermediate(GatePermit),
    Final {
        permit: GatePermit,
        solution: S,
        consumer: Option<FinalBestSolutionConsumer<S>>,
    },
    Failed(ConsumerError),
}

/// Runs the callbacks on the worker thread.
struct ConsumerWorker<S, I> {
    problem_id: I,
    holder: Arc<BestSolutionHolder<S>>,
    gate: Arc<ConsumptionGate>,
    intermediate: Option<BestSolutionConsumer<S>>,
    exception_handler: Option<ExceptionHandler<I>>,
}

impl<S: PlanningSolution, I: Debug> ConsumerWorker<S, I> {
    fn run(mut self, deliveries: Receiver<Delivery<S>>) {
        for delivery in deliveries {
            match delivery {
                Delivery::Intermediate(permit) => self.deliver_intermediate(permit),
                Delivery::Final {
                    permit,
                    solution,
                    consumer,
                } => {
                    self.deliver_final(solution, consumer);
                    drop(permit);
                    break;
                }
                Delivery::Failed(e) => {
                    self.handle(&e);
                    break;
                }
            }
        }
        debug!(event = "consumer_worker_stopped", problem_id = ?self.problem_id);
    }

    fn deliver_intermediate(&mut self, permit: GatePermit) {
        let mut permit = permit;
        loop {
            if let Some(best) = self.holder.take() {
                self.consume_intermediate(best);
            }
            drop(permit);
            // Re-arm: a solution stored while the permit was held found the gate busy.
            if !self.holder.has_solution() {
                return;
            }
            match self.gate.try_acquire() {
                Some(next) => permit = next,
                None => return,
            }
        }
    }

    fn consume_intermediate(&mut self, mut best: VersionedBestSolution<S>) {
        let Some(consumer) = self.intermediate.as_mut() else {
            best.complete_changes();
            return;
        };
        let solution = best.solution.clone();
        let outcome = invoke(|| consumer(solution));
        self.resolve(best, outcome);
    }

    fn deliver_final(&mut self, solution: S, consumer: Option<FinalBestSolutionConsumer<S>>) {
        if self.intermediate.is_some() && self.holder.has_solution() {
            if let Some(best) = self.holder.take() {
                self.consume_intermediate(best);
            }
        }

        let outcome = match consumer {
            Some(consumer) => invoke(move || consumer(solution)),
            None => Ok(()),
        };

        if self.intermediate.is_none() {
            if let Some(best) = self.holder.take() {
                self.resolve(best, outcome);
            } else if let Err(e) = outcome {
                self.report(&e);
            }
        } else if let Err(e) = outcome {
            self.report(&e);
        }

        // Changes submitted after the last stored best solution never made it in.
        self.holder.cancel_pending_changes();
    }

    fn resolve(
        &self,
        mut best: VersionedBestSolution<S>,
        outcome: std::result::Result<(), ConsumerError>,
    ) {
        match outcome {
            Ok(()) => best.complete_changes(),
            Err(e) => {
                self.report(&e);
                best.fail_changes(&ProblemChangeError::from(&e));
            }
        }
    }

    fn report(&self, e: &ConsumerError) {
        error!(event = "consumer_failed", problem_id = ?self.problem_id, error = %e);
        self.handle(e);
    }

    fn handle(&self, e: &ConsumerError) {
        if let Some(handler) = &self.exception_handler {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(&self.problem_id, e))).is_err() {
                warn!(event = "exception_handler_panicked", problem_id = ?self.problem_id);
            }
        }
    }
}

fn invoke<F>(callback: F) -> std::result::Result<(), ConsumerError>
where
    F: FnOnce() -> std::result::Result<(), BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConsumerError::Failed(e)),
        Err(payload) => Err(ConsumerError::from_panic(payload)),
    }
}

/// Hands best solutions from the solver thread to the consumer worker.
pub struct ConsumerSupport<S: PlanningSolution, I> {
    problem_id: I,
    handle: SolverHandle<S>,
    holder: Arc<BestSolutionHolder<S>>,
    gate: Arc<ConsumptionGate>,
    has_intermediate: bool,
    final_consumer: Option<FinalBestSolutionConsumer<S>>,
    deliveries: Option<Sender<Delivery<S>>>,
    worker: Option<JoinHandle<()>>,
}

impl<S, I> ConsumerSupport<S, I>
where
    S: PlanningSolution,
    I: Clone + Debug + Send + 'static,
{
    /// Starts the worker thread of `problem_id`.
    pub fn new(
        problem_id: I,
        handle: SolverHandle<S>,
        holder: Arc<BestSolutionHolder<S>>,
        consumers: BestSolutionConsumers<S, I>,
    ) -> Result<Self> {
        let gate = Arc::new(ConsumptionGate::default());
        let (tx, rx) = channel::unbounded();
        let has_intermediate = consumers.has_intermediate();
        let worker = ConsumerWorker {
            problem_id: problem_id.clone(),
            holder: Arc::clone(&holder),
            gate: Arc::clone(&gate),
            intermediate: consumers.intermediate,
            exception_handler: consumers.exception_handler,
        };
        let join = thread::Builder::new()
            .name(format!("planwright-consumer-{:?}", problem_id))
            .spawn(move || worker.run(rx))
            .map_err(|e| {
                PlanwrightError::InvalidState(format!("cannot start the consumer thread: {}", e))
            })?;

        Ok(Self {
            problem_id,
            handle,
            holder,
            gate,
            has_intermediate,
            final_consumer: consumers.final_consumer,
            deliveries: Some(tx),
            worker: Some(join),
        })
    }

    /// Records `solution` in the holder and schedules its delivery.
    ///
    /// Never blocks on consumer work. Returns whether the holder accepted the
    /// solution.
    pub fn consume_intermediate_best_solution(&self, solution: S) -> bool {
        let handle = &self.handle;
        let stored = self
            .holder
            .set(solution, || handle.is_every_problem_change_processed());
        if self.has_intermediate {
            self.schedule_intermediate();
        }
        stored
    }

    fn schedule_intermediate(&self) {
        let Some(tx) = &self.deliveries else {
            return;
        };
        if let Some(permit) = self.gate.try_acquire() {
            // A failed send drops the permit with the message.
            let _ = tx.send(Delivery::Intermediate(permit));
        }
    }

    /// Delivers the final best solution and stops the worker.
    ///
    /// Blocks until the in-flight delivery and the final callback finish.
    /// Changes still pending afterwards are cancelled.
    pub fn consume_final_best_solution(&mut self, solution: S) {
        let Some(tx) = self.deliveries.take() else {
            warn!(event = "final_best_solution_repeated", problem_id = ?self.problem_id);
            return;
        };
        let permit = self.gate.acquire();
        let delivery = Delivery::Final {
            permit,
            solution,
            consumer: self.final_consumer.take(),
        };
        if tx.send(delivery).is_err() {
            self.holder.cancel_pending_changes();
        }
        drop(tx);
        self.join_worker();
    }

    /// Hands a failed search to the exception handler and stops the worker.
    ///
    /// Deliveries already scheduled run first. Pending changes are cancelled.
    pub fn fail(&mut self, error: SolverJobError) {
        if let Some(tx) = self.deliveries.take() {
            let _ = tx.send(Delivery::Failed(ConsumerError::Solver(error)));
        }
        self.join_worker();
        self.holder.cancel_pending_changes();
    }

    /// Stops the worker without a final delivery, cancelling pending changes.
    pub fn close(&mut self) {
        self.deliveries = None;
        self.join_worker();
        self.holder.cancel_pending_changes();
    }

    pub fn holder(&self) -> &Arc<BestSolutionHolder<S>> {
        &self.holder
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(event = "consumer_worker_panicked", problem_id = ?self.problem_id);
            }
        }
    }
}

impl<S: PlanningSolution, I> Drop for ConsumerSupport<S, I> {
    fn drop(&mut self) {
        self.deliveries = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl<S: PlanningSolution, I: Debug> Debug for ConsumerSupport<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerSupport")
            .field("problem_id", &self.problem_id)
            .field("has_intermediate", &self.has_intermediate)
            .field("running", &self.worker.is_some())
            .finish()
    }
}
