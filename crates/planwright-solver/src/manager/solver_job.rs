//! One submitted problem and the thread solving it.

use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use planwright_config::SolverConfig;
use planwright_core::domain::PlanningSolution;
use planwright_scoring::ScoreDirectorFactory;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{panic_message, ProblemChangeError, SolverJobError};
use crate::realtime::{
    BestSolutionConsumers, BestSolutionHolder, ConsumerSupport, ProblemChange,
    ProblemChangeFuture, ProblemChangeReceiver, SolverHandle,
};
use crate::scope::SolverScope;
use crate::solver::Solver;
use crate::termination::build_termination;

/// Status of a solver job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// Submitted, waiting for its thread to start solving.
    SolvingScheduled,
    /// The solver thread is solving.
    SolvingActive,
    /// Finished, terminated or never started.
    NotSolving,
}

impl SolverStatus {
    /// Returns the status as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::SolvingScheduled => "SOLVING_SCHEDULED",
            SolverStatus::SolvingActive => "SOLVING_ACTIVE",
            SolverStatus::NotSolving => "NOT_SOLVING",
        }
    }
}

type JobOutcome<S> = Result<S, SolverJobError>;

struct JobTimes {
    started: Option<Instant>,
    ended: Option<Instant>,
}

struct JobState<S: PlanningSolution> {
    status: Mutex<SolverStatus>,
    handle: SolverHandle<S>,
    holder: Arc<BestSolutionHolder<S>>,
    terminated_early: AtomicBool,
    times: Mutex<JobTimes>,
    outcome: Mutex<Option<JobOutcome<S>>>,
    terminated: Condvar,
}

/// A problem submitted to a [`SolverManager`](super::SolverManager).
///
/// Cloning the job clones a handle to the same job.
pub struct SolverJob<S: PlanningSolution, I> {
    problem_id: I,
    state: Arc<JobState<S>>,
}

impl<S: PlanningSolution, I: Clone> Clone for SolverJob<S, I> {
    fn clone(&self) -> Self {
        Self {
            problem_id: self.problem_id.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S, I> SolverJob<S, I>
where
    S: PlanningSolution,
    I: Clone + Debug + Send + 'static,
{
    /// Creates a scheduled job and the receiver its solver thread reads changes from.
    pub(crate) fn scheduled(problem_id: I) -> (Self, ProblemChangeReceiver<S>) {
        let (handle, receiver) = SolverHandle::new();
        // Changes are accepted as soon as the job is scheduled.
        handle.set_solving(true);
        let state = JobState {
            status: Mutex::new(SolverStatus::SolvingScheduled),
            handle,
            holder: Arc::new(BestSolutionHolder::new()),
            terminated_early: AtomicBool::new(false),
            times: Mutex::new(JobTimes {
                started: None,
                ended: None,
            }),
            outcome: Mutex::new(None),
            terminated: Condvar::new(),
        };
        (
            Self {
                problem_id,
                state: Arc::new(state),
            },
            receiver,
        )
    }

    pub fn problem_id(&self) -> &I {
        &self.problem_id
    }

    pub fn status(&self) -> SolverStatus {
        *self.state.status.lock()
    }

    /// Submits a change to the problem being solved.
    ///
    /// The future resolves once a best solution containing the change has
    /// been consumed, or is cancelled if solving ends first. A job that is
    /// not solving rejects the change right away.
    pub fn add_problem_change<P>(&self, change: P) -> ProblemChangeFuture
    where
        P: ProblemChange<S> + 'static,
    {
        let status = self.state.status.lock();
        if *status == SolverStatus::NotSolving {
            warn!(
                event = "problem_change_rejected",
                problem_id = ?self.problem_id,
                change = ?change,
            );
            return ProblemChangeFuture::resolved(Err(ProblemChangeError::SolverNotRunning));
        }
        self.state
            .holder
            .add_problem_change(&self.state.handle, Box::new(change))
    }

    /// Stops solving as soon as possible and waits until the job has terminated.
    ///
    /// A job that has not started yet never starts. Problem changes not
    /// contained in a consumed best solution are cancelled.
    pub fn terminate_early(&self) {
        {
            let mut status = self.state.status.lock();
            match *status {
                SolverStatus::SolvingScheduled => {
                    *status = SolverStatus::NotSolving;
                    self.state.terminated_early.store(true, Ordering::SeqCst);
                    self.state.handle.set_solving(false);
                    self.state.holder.cancel_pending_changes();
                }
                SolverStatus::SolvingActive => {
                    self.state.terminated_early.store(true, Ordering::SeqCst);
                    self.state.handle.terminate_early();
                }
                SolverStatus::NotSolving => {}
            }
        }
        info!(event = "terminate_early", problem_id = ?self.problem_id);
        self.wait_until_terminated();
    }

    pub fn is_terminated_early(&self) -> bool {
        self.state.terminated_early.load(Ordering::SeqCst)
    }

    /// Blocks until solving ends and returns the final best solution.
    ///
    /// A job terminated before it started returns the problem unchanged.
    pub fn final_best_solution(&self) -> Result<S, SolverJobError> {
        self.wait_for_termination()
    }

    /// Time spent solving: up to now while active, zero before starting.
    pub fn solving_duration(&self) -> Duration {
        let times = self.state.times.lock();
        match (times.started, times.ended) {
            (Some(started), Some(ended)) => ended.duration_since(started),
            (Some(started), None) => started.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }

    fn wait_for_termination(&self) -> JobOutcome<S> {
        let mut outcome = self.state.outcome.lock();
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            self.state.terminated.wait(&mut outcome);
        }
    }

    /// Like `wait_for_termination`, without cloning the outcome.
    fn wait_until_terminated(&self) {
        let mut outcome = self.state.outcome.lock();
        while outcome.is_none() {
            self.state.terminated.wait(&mut outcome);
        }
    }

    /// Runs the job on the current thread.
    ///
    /// `on_terminated` is called with the problem id once solving has ended,
    /// before anyone waiting on the job is released.
    pub(crate) fn run(
        &self,
        problem: S,
        factory: &ScoreDirectorFactory<S>,
        mut solver: Box<dyn Solver<S>>,
        receiver: ProblemChangeReceiver<S>,
        consumers: BestSolutionConsumers<S, I>,
        config: &SolverConfig,
        on_terminated: impl FnOnce(&I),
    ) {
        {
            let mut status = self.state.status.lock();
            if *status != SolverStatus::SolvingScheduled {
                drop(status);
                self.finish(Ok(problem), on_terminated);
                return;
            }
            *status = SolverStatus::SolvingActive;
        }
        self.state.times.lock().started = Some(Instant::now());
        info!(event = "solve_started", problem_id = ?self.problem_id);

        let mut support = match ConsumerSupport::new(
            self.problem_id.clone(),
            self.state.handle.clone(),
            Arc::clone(&self.state.holder),
            consumers,
        ) {
            Ok(support) => support,
            Err(e) => {
                self.state.handle.set_solving(false);
                self.state.holder.cancel_pending_changes();
                self.finish(Err(e.into()), on_terminated);
                return;
            }
        };

        let outcome = {
            let publish = |best: S| {
                support.consume_intermediate_best_solution(best);
            };
            let solve = AssertUnwindSafe(|| -> planwright_core::Result<S> {
                let director = factory.build_score_director(problem)?;
                let scope = match config.random_seed {
                    Some(seed) => SolverScope::with_seed(director, seed),
                    None => SolverScope::new(director),
                };
                let mut scope = scope
                    .with_problem_changes(&receiver)
                    .with_best_solution_publisher(&publish);
                if let Some(termination) = config.termination.as_ref().and_then(build_termination::<S>) {
                    scope = scope.with_termination(termination);
                }
                scope.start_solving()?;
                solver.solve(&mut scope)?;
                Ok(scope.take_best_or_working_solution())
            });
            match panic::catch_unwind(solve) {
                Ok(result) => result.map_err(SolverJobError::from),
                Err(payload) => Err(SolverJobError::Panicked(panic_message(payload))),
            }
        };
        self.state.handle.set_solving(false);

        match &outcome {
            Ok(best) => support.consume_final_best_solution(best.clone()),
            Err(e) => {
                error!(event = "solve_failed", problem_id = ?self.problem_id, error = %e);
                support.fail(e.clone());
            }
        }
        self.finish(outcome, on_terminated);
    }

    fn finish(&self, outcome: JobOutcome<S>, on_terminated: impl FnOnce(&I)) {
        *self.state.status.lock() = SolverStatus::NotSolving;
        self.state.times.lock().ended = Some(Instant::now());
        on_terminated(&self.problem_id);
        info!(
            event = "solve_ended",
            problem_id = ?self.problem_id,
            terminated_early = self.is_terminated_early(),
            success = outcome.is_ok(),
            duration_ms = u64::try_from(self.solving_duration().as_millis()).unwrap_or(u64::MAX),
        );
        *self.state.outcome.lock() = Some(outcome);
        self.state.terminated.notify_all();
    }
}

impl<S: PlanningSolution, I: Debug> Debug for SolverJob<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverJob")
            .field("problem_id", &self.problem_id)
            .field("status", &*self.state.status.lock())
            .field("terminated_early", &self.state.terminated_early.load(Ordering::SeqCst))
            .finish()
    }
}
