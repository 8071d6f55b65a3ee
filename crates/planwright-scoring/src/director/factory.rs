//! Score director factory for creating score directors.

use std::fmt;
use std::sync::Arc;

use planwright_config::{EnvironmentMode, SolverConfig};
use planwright_core::domain::{PlanningSolution, SolutionDescriptor};
use planwright_core::{PlanwrightError, Result};

use super::cloner::{CloneSolutionCloner, SolutionCloner};
use super::score_director::DefaultScoreDirector;
use crate::calculator::{EasyScoreCalculator, ScoreCalculator};

/// Creates a fresh score calculator for every score director.
pub type CalculatorFactory<S> = Arc<dyn Fn() -> Box<dyn ScoreCalculator<S>> + Send + Sync>;

/// Factory for creating score directors.
///
/// Cloning the factory is cheap: the descriptor, calculator factory and
/// cloner are shared.
///
/// # Example
///
/// ```
/// use planwright_config::EnvironmentMode;
/// use planwright_scoring::{ScoreDirector, ScoreDirectorFactory};
/// use planwright_test::nqueens::{calculate_conflicts, nqueens_descriptor, NQueensSolution};
///
/// let factory = ScoreDirectorFactory::easy(nqueens_descriptor(), calculate_conflicts)
///     .with_environment_mode(EnvironmentMode::FullAssert);
/// let mut director = factory
///     .build_score_director(NQueensSolution::with_rows(&[0, 2, 4, 1, 3]))
///     .unwrap();
/// assert_eq!(director.calculate_score().unwrap().to_string(), "0");
/// ```
pub struct ScoreDirectorFactory<S: PlanningSolution> {
    descriptor: Arc<SolutionDescriptor<S>>,
    calculator_factory: CalculatorFactory<S>,
    environment_mode: EnvironmentMode,
    lookup_enabled: bool,
    constraint_match_enabled: bool,
    assert_cloned_solution: bool,
    assertion_factory: Option<Arc<ScoreDirectorFactory<S>>>,
    cloner: Arc<dyn SolutionCloner<S>>,
}

impl<S: PlanningSolution> ScoreDirectorFactory<S> {
    /// Creates a factory whose directors get a calculator from `calculator_factory`.
    pub fn new<F, C>(descriptor: impl Into<Arc<SolutionDescriptor<S>>>, calculator_factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: ScoreCalculator<S> + 'static,
    {
        Self {
            descriptor: descriptor.into(),
            calculator_factory: Arc::new(move || {
                Box::new(calculator_factory()) as Box<dyn ScoreCalculator<S>>
            }),
            environment_mode: EnvironmentMode::default(),
            lookup_enabled: true,
            constraint_match_enabled: false,
            assert_cloned_solution: false,
            assertion_factory: None,
            cloner: Arc::new(CloneSolutionCloner),
        }
    }

    /// Creates a factory recalculating the score with `calculator` every time.
    pub fn easy<F>(descriptor: impl Into<Arc<SolutionDescriptor<S>>>, calculator: F) -> Self
    where
        F: Fn(&S) -> S::Score + Clone + Send + Sync + 'static,
    {
        Self::new(descriptor, move || EasyScoreCalculator::new(calculator.clone()))
    }

    /// Creates a factory from the score director section of a solver config.
    ///
    /// # Errors
    ///
    /// Fails if the config asks for cloned-solution assertions outside an
    /// asserted environment mode.
    pub fn from_config<F, C>(
        config: &SolverConfig,
        descriptor: impl Into<Arc<SolutionDescriptor<S>>>,
        calculator_factory: F,
    ) -> Result<Self>
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: ScoreCalculator<S> + 'static,
    {
        let score_director = config.score_director_config();
        let mut factory = Self::new(descriptor, calculator_factory)
            .with_environment_mode(config.environment_mode)
            .with_lookup_enabled(score_director.lookup_enabled)
            .with_constraint_match_enabled(score_director.constraint_match_enabled);
        if let Some(assert_cloned_solution) = score_director.assert_cloned_solution {
            if assert_cloned_solution && !config.environment_mode.is_asserted() {
                return Err(PlanwrightError::Config(format!(
                    "The environment mode ({:?}) does not assert, so assert_cloned_solution cannot be enabled.",
                    config.environment_mode
                )));
            }
            factory = factory.with_assert_cloned_solution(assert_cloned_solution);
        }
        Ok(factory)
    }

    /// Sets the environment mode. Full assert modes also assert cloned solutions.
    pub fn with_environment_mode(mut self, environment_mode: EnvironmentMode) -> Self {
        self.environment_mode = environment_mode;
        self.assert_cloned_solution = environment_mode.is_non_intrusive_full_asserted();
        self
    }

    pub fn with_lookup_enabled(mut self, lookup_enabled: bool) -> Self {
        self.lookup_enabled = lookup_enabled;
        self
    }

    pub fn with_constraint_match_enabled(mut self, constraint_match_enabled: bool) -> Self {
        self.constraint_match_enabled = constraint_match_enabled;
        self
    }

    pub fn with_assert_cloned_solution(mut self, assert_cloned_solution: bool) -> Self {
        self.assert_cloned_solution = assert_cloned_solution;
        self
    }

    pub fn with_solution_cloner(mut self, cloner: impl SolutionCloner<S> + 'static) -> Self {
        self.cloner = Arc::new(cloner);
        self
    }

    /// Uses `assertion_factory` to build the uncorrupted directors of the
    /// from-scratch assertions.
    ///
    /// Set the environment mode first.
    ///
    /// # Errors
    ///
    /// Fails if `assertion_factory` has an assertion factory of its own or if
    /// the environment mode does not assert.
    pub fn with_assertion_factory(mut self, assertion_factory: ScoreDirectorFactory<S>) -> Result<Self> {
        if assertion_factory.assertion_factory.is_some() {
            return Err(PlanwrightError::Config(
                "An assertion score director factory cannot have an assertion score director factory of its own."
                    .to_string(),
            ));
        }
        if !self.environment_mode.is_asserted() {
            return Err(PlanwrightError::Config(format!(
                "An assertion score director factory is configured, but the environment mode ({:?}) does not assert.\n\
                 Maybe use an asserted environment mode or remove the assertion score director factory.",
                self.environment_mode
            )));
        }
        self.assertion_factory = Some(Arc::new(assertion_factory));
        Ok(self)
    }

    /// Like [`with_assertion_factory`](Self::with_assertion_factory) with a
    /// factory that shares this factory's descriptor and cloner.
    pub fn with_assertion_calculator<F, C>(self, calculator_factory: F) -> Result<Self>
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: ScoreCalculator<S> + 'static,
    {
        let mut assertion_factory = Self::new(Arc::clone(&self.descriptor), calculator_factory)
            .with_lookup_enabled(false)
            .with_constraint_match_enabled(true);
        assertion_factory.cloner = Arc::clone(&self.cloner);
        self.with_assertion_factory(assertion_factory)
    }

    /// Creates a score director on `solution` with this factory's defaults.
    pub fn build_score_director(&self, solution: S) -> Result<DefaultScoreDirector<S>> {
        self.build_score_director_with(solution, self.lookup_enabled, self.constraint_match_enabled)
    }

    /// Creates a score director on `solution`.
    ///
    /// # Errors
    ///
    /// Fails if lookup is enabled and the solution's planning ids are missing
    /// or duplicated.
    pub fn build_score_director_with(
        &self,
        solution: S,
        lookup_enabled: bool,
        constraint_match_enabled: bool,
    ) -> Result<DefaultScoreDirector<S>> {
        DefaultScoreDirector::new(self.clone(), solution, lookup_enabled, constraint_match_enabled)
    }

    pub(crate) fn create_calculator(&self) -> Box<dyn ScoreCalculator<S>> {
        (self.calculator_factory.as_ref())()
    }

    /// Returns a reference to the solution descriptor.
    pub fn solution_descriptor(&self) -> &Arc<SolutionDescriptor<S>> {
        &self.descriptor
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn is_lookup_enabled(&self) -> bool {
        self.lookup_enabled
    }

    pub fn is_constraint_match_enabled(&self) -> bool {
        self.constraint_match_enabled
    }

    pub fn is_assert_cloned_solution(&self) -> bool {
        self.assert_cloned_solution
    }

    pub fn assertion_factory(&self) -> Option<&ScoreDirectorFactory<S>> {
        self.assertion_factory.as_deref()
    }

    pub fn solution_cloner(&self) -> &dyn SolutionCloner<S> {
        self.cloner.as_ref()
    }
}

impl<S: PlanningSolution> Clone for ScoreDirectorFactory<S> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            calculator_factory: Arc::clone(&self.calculator_factory),
            environment_mode: self.environment_mode,
            lookup_enabled: self.lookup_enabled,
            constraint_match_enabled: self.constraint_match_enabled,
            assert_cloned_solution: self.assert_cloned_solution,
            assertion_factory: self.assertion_factory.clone(),
            cloner: Arc::clone(&self.cloner),
        }
    }
}

impl<S: PlanningSolution> fmt::Debug for ScoreDirectorFactory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreDirectorFactory")
            .field("solution", &self.descriptor.type_name)
            .field("environment_mode", &self.environment_mode)
            .field("lookup_enabled", &self.lookup_enabled)
            .field("constraint_match_enabled", &self.constraint_match_enabled)
            .field("assert_cloned_solution", &self.assert_cloned_solution)
            .field("has_assertion_factory", &self.assertion_factory.is_some())
            .finish()
    }
}
