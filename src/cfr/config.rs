//! Configuration options for the CFR solver.
//!
//! This module provides the configuration struct that selects the traversal
//! variant, seeds chance sampling and controls progress logging, plus the
//! statistics collected while training.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the CFR solver.
///
/// The traversal variant is fixed when the solver is built:
/// - **Exhaustive** (`chance_sampling = false`): every chance outcome is
///   enumerated and strategies are updated in a separate pass after the sweep.
/// - **Chance sampling** (`chance_sampling = true`): one chance outcome is
///   drawn per chance node per iteration and strategies are updated inline.
///
/// # Example
/// ```
/// use cfr_solver::cfr::CFRConfig;
///
/// let config = CFRConfig::default();
/// assert!(!config.chance_sampling); // exhaustive by default
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFRConfig {
    /// Sample one outcome at chance nodes instead of enumerating them all.
    pub chance_sampling: bool,

    /// Random seed for reproducibility.
    ///
    /// Only used by chance sampling. If `None`, the generator is seeded from
    /// system entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Log progress every this many iterations.
    ///
    /// Set to `None` to only log the start and end of a run.
    #[serde(default)]
    pub log_interval: Option<u64>,
}

impl Default for CFRConfig {
    fn default() -> Self {
        Self::vanilla()
    }
}

impl CFRConfig {
    /// Create a new CFRConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exhaustive CFR: exact expectation at chance nodes.
    pub fn vanilla() -> Self {
        Self {
            chance_sampling: false,
            seed: None,
            log_interval: None,
        }
    }

    /// Chance-sampling CFR: one sampled outcome per chance node.
    pub fn chance_sampling() -> Self {
        Self {
            chance_sampling: true,
            ..Self::vanilla()
        }
    }

    /// Builder method: select the traversal variant.
    pub fn with_chance_sampling(mut self, enable: bool) -> Self {
        self.chance_sampling = enable;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the progress logging interval.
    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = Some(interval);
        self
    }

    /// Parse a configuration from JSON and validate it.
    ///
    /// Missing optional fields fall back to `None`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CFRConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_interval == Some(0) {
            return Err(ConfigError::InvalidLogInterval);
        }

        Ok(())
    }
}

/// Errors that can occur when loading or validating CFR configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Logging interval of zero iterations.
    #[error("log interval must be at least one iteration")]
    InvalidLogInterval,

    /// The configuration text is not valid JSON for [`CFRConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Statistics tracked during CFR training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CFRStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of decision information sets in the tree.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,
}

impl CFRStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }
}
