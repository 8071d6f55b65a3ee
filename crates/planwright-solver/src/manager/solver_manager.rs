//! Runs solver jobs, one thread per submitted problem.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use planwright_config::SolverConfig;
use planwright_core::domain::PlanningSolution;
use planwright_core::{PlanwrightError, Result};
use planwright_scoring::ScoreDirectorFactory;
use tracing::{debug, warn};

use super::solver_job::{SolverJob, SolverStatus};
use crate::error::ProblemChangeError;
use crate::realtime::{BestSolutionConsumers, ProblemChange, ProblemChangeFuture};
use crate::solver::Solver;

/// Creates a fresh search for every job.
pub type SolverFactory<S> = Arc<dyn Fn() -> Box<dyn Solver<S>> + Send + Sync>;

type JobRegistry<S, I> = Arc<Mutex<HashMap<I, SolverJob<S, I>>>>;

/// Solves problems asynchronously and delivers their best solutions.
///
/// Each problem is identified by a caller-chosen id. A job stays registered
/// under its id while it is scheduled or solving, and unregisters itself once
/// it has terminated, so the id can be reused afterwards.
pub struct SolverManager<S: PlanningSolution, I> {
    score_director_factory: Arc<ScoreDirectorFactory<S>>,
    solver_factory: SolverFactory<S>,
    config: SolverConfig,
    jobs: JobRegistry<S, I>,
}

impl<S, I> SolverManager<S, I>
where
    S: PlanningSolution,
    I: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    pub fn new<F>(
        score_director_factory: ScoreDirectorFactory<S>,
        solver_factory: F,
        config: SolverConfig,
    ) -> Self
    where
        F: Fn() -> Box<dyn Solver<S>> + Send + Sync + 'static,
    {
        Self {
            score_director_factory: Arc::new(score_director_factory),
            solver_factory: Arc::new(solver_factory),
            config,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Solves `problem` without listening to its best solutions.
    pub fn solve(&self, problem_id: I, problem: S) -> Result<SolverJob<S, I>> {
        self.solve_with(problem_id, problem, BestSolutionConsumers::new())
    }

    /// Solves `problem`, handing every new best solution to `consumer`.
    ///
    /// The consumer runs on the job's consumer thread and may skip
    /// intermediate best solutions that were superseded while it was busy.
    pub fn solve_and_listen<F>(&self, problem_id: I, problem: S, mut consumer: F) -> Result<SolverJob<S, I>>
    where
        F: FnMut(S) + Send + 'static,
    {
        let consumers = BestSolutionConsumers::new().with_intermediate(move |solution| {
            consumer(solution);
            Ok(())
        });
        self.solve_with(problem_id, problem, consumers)
    }

    /// Solves `problem` with the given consumers.
    ///
    /// Fails if a job with the same id is still registered.
    pub fn solve_with(
        &self,
        problem_id: I,
        problem: S,
        consumers: BestSolutionConsumers<S, I>,
    ) -> Result<SolverJob<S, I>> {
        let (job, receiver) = SolverJob::scheduled(problem_id.clone());
        {
            let mut jobs = self.jobs.lock();
            if jobs.contains_key(&problem_id) {
                return Err(PlanwrightError::InvalidState(format!(
                    "problem {:?} is already being solved",
                    problem_id
                )));
            }
            jobs.insert(problem_id.clone(), job.clone());
        }

        let worker_job = job.clone();
        let factory = Arc::clone(&self.score_director_factory);
        let solver = (self.solver_factory)();
        let config = self.config.clone();
        let jobs = Arc::clone(&self.jobs);
        let spawned = thread::Builder::new()
            .name(format!("planwright-solver-{:?}", problem_id))
            .spawn(move || {
                worker_job.run(problem, &factory, solver, receiver, consumers, &config, |id| {
                    jobs.lock().remove(id);
                });
            });

        match spawned {
            Ok(_) => {
                debug!(event = "job_scheduled", problem_id = ?problem_id);
                Ok(job)
            }
            Err(e) => {
                self.jobs.lock().remove(&problem_id);
                Err(PlanwrightError::InvalidState(format!(
                    "cannot start the solver thread of problem {:?}: {}",
                    problem_id, e
                )))
            }
        }
    }

    /// Returns the status of the job registered under `problem_id`.
    ///
    /// Unknown and finished problems are [`SolverStatus::NotSolving`].
    pub fn solver_status(&self, problem_id: &I) -> SolverStatus {
        self.job(problem_id)
            .map(|job| job.status())
            .unwrap_or(SolverStatus::NotSolving)
    }

    /// Submits a problem change to a running job.
    pub fn add_problem_change<P>(&self, problem_id: &I, change: P) -> ProblemChangeFuture
    where
        P: ProblemChange<S> + 'static,
    {
        match self.job(problem_id) {
            Some(job) => job.add_problem_change(change),
            None => {
                warn!(
                    event = "problem_change_rejected",
                    problem_id = ?problem_id,
                    change = ?change,
                );
                ProblemChangeFuture::resolved(Err(ProblemChangeError::SolverNotRunning))
            }
        }
    }

    /// Terminates the job of `problem_id` and waits for it.
    ///
    /// Returns false if no such job is registered.
    pub fn terminate_early(&self, problem_id: &I) -> bool {
        match self.job(problem_id) {
            Some(job) => {
                job.terminate_early();
                true
            }
            None => false,
        }
    }

    /// Terminates every registered job and waits for all of them.
    pub fn terminate_all(&self) {
        let jobs: Vec<_> = self.jobs.lock().values().cloned().collect();
        for job in jobs {
            job.terminate_early();
        }
    }

    /// Ids of the jobs currently scheduled or solving.
    pub fn problem_ids(&self) -> Vec<I> {
        self.jobs.lock().keys().cloned().collect()
    }

    fn job(&self, problem_id: &I) -> Option<SolverJob<S, I>> {
        self.jobs.lock().get(problem_id).cloned()
    }
}

impl<S: PlanningSolution, I> Debug for SolverManager<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverManager")
            .field("config", &self.config)
            .field("jobs", &self.jobs.lock().len())
            .finish()
    }
}
