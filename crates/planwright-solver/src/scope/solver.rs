//! Solver-level scope.

use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use planwright_core::domain::PlanningSolution;
use planwright_core::Result;
use planwright_scoring::{DefaultScoreDirector, ScoreDirector};
use tracing::debug;

use crate::realtime::ProblemChangeReceiver;
use crate::termination::Termination;

/// Everything a search sees while solving one problem.
///
/// The scope owns the score director of the working solution. Whenever the
/// best solution changes it is handed to the publisher, which forwards it to
/// the consumers of the job.
pub struct SolverScope<'a, S: PlanningSolution> {
    score_director: DefaultScoreDirector<S>,
    best_solution: Option<S>,
    best_score: Option<S::Score>,
    rng: StdRng,
    start_time: Option<Instant>,
    total_step_count: u64,
    problem_changes: Option<&'a ProblemChangeReceiver<S>>,
    publisher: Option<&'a (dyn Fn(S) + 'a)>,
    termination: Option<Box<dyn Termination<S> + 'a>>,
}

impl<'a, S: PlanningSolution> SolverScope<'a, S> {
    pub fn new(score_director: DefaultScoreDirector<S>) -> Self {
        Self::with_rng(score_director, StdRng::from_os_rng())
    }

    pub fn with_seed(score_director: DefaultScoreDirector<S>, seed: u64) -> Self {
        Self::with_rng(score_director, StdRng::seed_from_u64(seed))
    }

    fn with_rng(score_director: DefaultScoreDirector<S>, rng: StdRng) -> Self {
        Self {
            score_director,
            best_solution: None,
            best_score: None,
            rng,
            start_time: None,
            total_step_count: 0,
            problem_changes: None,
            publisher: None,
            termination: None,
        }
    }

    pub fn with_problem_changes(mut self, receiver: &'a ProblemChangeReceiver<S>) -> Self {
        self.problem_changes = Some(receiver);
        self
    }

    /// Sets the callback receiving every new best solution.
    pub fn with_best_solution_publisher(mut self, publisher: &'a (dyn Fn(S) + 'a)) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S> + 'a>) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Starts the clock and publishes the initial working solution as best.
    pub fn start_solving(&mut self) -> Result<()> {
        self.start_time = Some(Instant::now());
        self.total_step_count = 0;
        self.best_score = None;
        self.update_best_solution()?;
        Ok(())
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|t| t.elapsed())
    }

    pub fn score_director(&self) -> &DefaultScoreDirector<S> {
        &self.score_director
    }

    pub fn score_director_mut(&mut self) -> &mut DefaultScoreDirector<S> {
        &mut self.score_director
    }

    pub fn working_solution(&self) -> &S {
        self.score_director.working_solution()
    }

    pub fn calculate_score(&mut self) -> Result<S::Score> {
        self.score_director.calculate_score()
    }

    pub fn calculation_count(&self) -> u64 {
        self.score_director.calculation_count()
    }

    pub fn best_solution(&self) -> Option<&S> {
        self.best_solution.as_ref()
    }

    pub fn best_score(&self) -> Option<&S::Score> {
        self.best_score.as_ref()
    }

    /// Makes the working solution the best one if its score is better.
    ///
    /// Returns whether the best solution changed.
    pub fn update_best_solution(&mut self) -> Result<bool> {
        let current_score = self.score_director.calculate_score()?;
        let is_better = match &self.best_score {
            None => true,
            Some(best) => current_score > *best,
        };
        if is_better {
            self.replace_best_solution(current_score)?;
        }
        Ok(is_better)
    }

    fn replace_best_solution(&mut self, score: S::Score) -> Result<()> {
        let mut best = self.score_director.clone_working_solution()?;
        best.set_score(Some(score));
        debug!(
            event = "new_best_solution",
            score = %score,
            step = self.total_step_count,
        );
        if let Some(publish) = self.publisher {
            publish(best.clone());
        }
        self.best_solution = Some(best);
        self.best_score = Some(score);
        Ok(())
    }

    /// Applies the pending problem changes to the best solution.
    ///
    /// The working solution is first reset to a clone of the best solution,
    /// so the changes never apply on top of an unaccepted search state. The
    /// changed solution becomes the best solution whatever its score, since
    /// the previous best no longer describes the problem.
    pub fn process_problem_changes(&mut self) -> Result<usize> {
        let Some(receiver) = self.problem_changes else {
            return Ok(0);
        };
        if !receiver.has_pending() {
            return Ok(0);
        }
        if let Some(best) = &self.best_solution {
            let best = self.score_director.clone_solution(best)?;
            self.score_director.set_working_solution(best)?;
        }
        let applied = receiver.process_pending(&mut self.score_director)?;
        if applied > 0 {
            let score = self.score_director.calculate_score()?;
            self.replace_best_solution(score)?;
        }
        Ok(applied)
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.total_step_count += 1;
        self.total_step_count
    }

    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    pub fn is_terminate_early(&self) -> bool {
        self.problem_changes
            .is_some_and(|receiver| receiver.is_terminate_early_requested())
    }

    /// Returns true when the search should stop.
    pub fn is_terminated(&self) -> bool {
        self.is_terminate_early()
            || self
                .termination
                .as_ref()
                .is_some_and(|termination| termination.is_terminated(self))
    }

    pub fn take_best_solution(self) -> Option<S> {
        self.best_solution
    }

    pub fn take_best_or_working_solution(self) -> S {
        match self.best_solution {
            Some(best) => best,
            None => self.score_director.take_working_solution(),
        }
    }
}

impl<S: PlanningSolution> fmt::Debug for SolverScope<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverScope")
            .field("best_score", &self.best_score)
            .field("total_step_count", &self.total_step_count)
            .field("elapsed", &self.elapsed())
            .field("termination", &self.termination)
            .finish()
    }
}
