//! Search configuration.
//!
//! Mode flags and tunables shared by the exact and approximate orchestrators.
//! Invalid combinations are rejected by [`Config::validate`] before any
//! search starts; nothing downstream re-checks them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid mode combinations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Exact embedding forbids the omission branch, so disconnected pieces of
    /// G can only be reached through disconnected analysis.
    #[error("find_exact_embedding requires analyze_disconnected")]
    ExactEmbeddingWithoutDisconnected,
}

/// Global search configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Extend maximal matches by separately matching outsider components.
    pub analyze_disconnected: bool,
    /// Require every vertex of G to be mapped; report "no solution" otherwise.
    pub find_exact_embedding: bool,
    /// Number of randomized trials for the approximate orchestrator.
    pub trials: usize,
    /// Optional wall-clock budget for the approximate orchestrator, checked
    /// between trial batches only.
    pub time_budget: Option<Duration>,
    /// Bounded-lookahead step budget for grouped approximate trials.
    /// `None` selects one-shot greedy trials.
    pub lookahead: Option<u32>,
    /// Base seed for the approximate orchestrator's per-trial RNGs.
    pub seed: u64,
}

impl Config {
    /// Starts a builder with default settings.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Rejects invalid mode combinations.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ExactEmbeddingWithoutDisconnected`] when exact-embedding
    /// mode is requested without disconnected analysis.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.find_exact_embedding && !self.analyze_disconnected {
            return Err(ConfigError::ExactEmbeddingWithoutDisconnected);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyze_disconnected: false,
            find_exact_embedding: false,
            trials: 1024,
            time_budget: None,
            lookahead: None,
            seed: 0,
        }
    }
}

/// Fluent builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Enables or disables disconnected-component analysis.
    #[must_use]
    pub const fn analyze_disconnected(mut self, enabled: bool) -> Self {
        self.config.analyze_disconnected = enabled;
        self
    }

    /// Enables or disables exact-embedding mode.
    #[must_use]
    pub const fn find_exact_embedding(mut self, enabled: bool) -> Self {
        self.config.find_exact_embedding = enabled;
        self
    }

    /// Sets the approximate trial count.
    #[must_use]
    pub const fn trials(mut self, trials: usize) -> Self {
        self.config.trials = trials;
        self
    }

    /// Sets the approximate wall-clock budget.
    #[must_use]
    pub const fn time_budget(mut self, budget: Duration) -> Self {
        self.config.time_budget = Some(budget);
        self
    }

    /// Sets the grouped-trial lookahead budget.
    #[must_use]
    pub const fn lookahead(mut self, steps: u32) -> Self {
        self.config.lookahead = Some(steps);
        self
    }

    /// Sets the base RNG seed for randomized trials.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Finalizes the configuration. Validation happens at search entry.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
