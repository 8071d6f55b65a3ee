//! Configuration system for Planwright.
//!
//! Load solver configuration from TOML or YAML to control the environment
//! mode, the score director and termination without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use planwright_config::{EnvironmentMode, SolverConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!
//!     [score_director]
//!     constraint_match_enabled = true
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert!(config.score_director_config().constraint_match_enabled);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use planwright_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Environment mode affecting reproducibility and assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for reproducible results.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Score director configuration.
    #[serde(default)]
    pub score_director: Option<ScoreDirectorConfig>,
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot be honored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero score calculation limit
    /// or a cloned solution assertion outside an asserted environment mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(termination) = &self.termination {
            if termination.score_calculation_count_limit == Some(0) {
                return Err(ConfigError::Invalid(
                    "The score_calculation_count_limit (0) must be positive.".to_string(),
                ));
            }
        }
        if let Some(score_director) = &self.score_director {
            if score_director.assert_cloned_solution == Some(true)
                && !self.environment_mode.is_asserted()
            {
                return Err(ConfigError::Invalid(format!(
                    "Asserting cloned solutions requires an asserted environment mode, \
                     but the environment mode is ({:?}).",
                    self.environment_mode
                )));
            }
        }
        Ok(())
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, environment_mode: EnvironmentMode) -> Self {
        self.environment_mode = environment_mode;
        self
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the score director configuration.
    pub fn with_score_director(mut self, score_director: ScoreDirectorConfig) -> Self {
        self.score_director = Some(score_director);
        self
    }

    /// Returns the score director configuration, or the defaults.
    pub fn score_director_config(&self) -> ScoreDirectorConfig {
        self.score_director.clone().unwrap_or_default()
    }

    /// Returns the termination time limit, if configured.
    ///
    /// Convenience method that delegates to `termination.time_limit()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use planwright_config::SolverConfig;
    /// use std::time::Duration;
    ///
    /// let config = SolverConfig::from_toml_str(r#"
    ///     [termination]
    ///     seconds_spent_limit = 30
    /// "#).unwrap();
    ///
    /// assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
    /// ```
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }
}

/// Environment mode affecting solver behavior.
///
/// Variants are ordered from the cheapest to the most thorough assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Non-reproducible mode with minimal overhead.
    NonReproducible,

    /// Reproducible mode with deterministic behavior.
    #[default]
    Reproducible,

    /// Fast assert mode: cheap intrusive checks such as undo move scores.
    FastAssert,

    /// Full assert mode limited to checks that never change the solving path.
    NonIntrusiveFullAssert,

    /// Full assert mode with comprehensive assertions.
    FullAssert,
}

impl EnvironmentMode {
    /// Returns true for every mode that enables some assertion.
    pub fn is_asserted(&self) -> bool {
        *self >= EnvironmentMode::FastAssert
    }

    /// Returns true if every step is verified against a from-scratch score.
    pub fn is_non_intrusive_full_asserted(&self) -> bool {
        matches!(
            self,
            EnvironmentMode::NonIntrusiveFullAssert | EnvironmentMode::FullAssert
        )
    }

    /// Returns true if intrusive checks (undo moves, predicted scores) run.
    pub fn is_intrusive_fast_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    /// Returns true if results are reproducible for a fixed seed.
    pub fn is_reproducible(&self) -> bool {
        *self != EnvironmentMode::NonReproducible
    }
}

/// Termination configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum seconds to spend solving.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum minutes to spend solving.
    pub minutes_spent_limit: Option<u64>,

    /// Maximum number of score calculations.
    pub score_calculation_count_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds =
            self.seconds_spent_limit.unwrap_or(0) + self.minutes_spent_limit.unwrap_or(0) * 60;
        if seconds > 0 {
            Some(Duration::from_secs(seconds))
        } else {
            None
        }
    }
}

/// Score director configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ScoreDirectorConfig {
    /// Whether constraint matches are tracked by default.
    pub constraint_match_enabled: bool,

    /// Whether score directors index working objects by planning id.
    pub lookup_enabled: bool,

    /// Overrides whether cloned solutions are verified. Defaults to the
    /// environment mode's full assert flag.
    pub assert_cloned_solution: Option<bool>,
}

impl Default for ScoreDirectorConfig {
    fn default() -> Self {
        Self {
            constraint_match_enabled: false,
            lookup_enabled: true,
            assert_cloned_solution: None,
        }
    }
}

/// Runtime configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct SolverConfigOverride {
    /// Override termination configuration.
    pub termination: Option<TerminationConfig>,
}

impl SolverConfigOverride {
    /// Creates a new override with termination configuration.
    pub fn with_termination(termination: TerminationConfig) -> Self {
        SolverConfigOverride {
            termination: Some(termination),
        }
    }

    /// Applies the override to a configuration.
    pub fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(termination) = &self.termination {
            config.termination = Some(termination.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests;
