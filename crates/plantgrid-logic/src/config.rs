//! Search configuration.
//!
//! Defaults match the two buttons of the planner screen: "optimum"
//! (first layout at 50% density within 1000 attempts) and "extremely
//! optimum" (best of 500 attempts).
//!
//! ```
//! use plantgrid_logic::config::{validate_config, SearchConfig};
//!
//! let config = SearchConfig::from_json(r#"{ "density": 0.6, "seed": 7 }"#).unwrap();
//! assert_eq!(config.attempt_cap, 1000);
//! assert!(validate_config(&config).is_empty());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DENSITY: f64 = 0.5;
pub const DEFAULT_ATTEMPT_CAP: usize = 1000;
pub const DEFAULT_BEST_OF_ATTEMPTS: usize = 500;
pub const DEFAULT_YIELD_PAUSE_MS: u64 = 1;

/// Tunables for both search policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fraction of all cells a density run must reach (0–1).
    pub density: f64,
    /// Maximum attempts for a density run.
    pub attempt_cap: usize,
    /// Attempts for a best-of run.
    pub best_of_attempts: usize,
    /// Pause between attempts so the host can redraw.
    pub yield_pause_ms: u64,
    /// Seed for reproducible runs (None = entropy).
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            attempt_cap: DEFAULT_ATTEMPT_CAP,
            best_of_attempts: DEFAULT_BEST_OF_ATTEMPTS,
            yield_pause_ms: DEFAULT_YIELD_PAUSE_MS,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn yield_pause(&self) -> Duration {
        Duration::from_millis(self.yield_pause_ms)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Density outside 0–1 or not a number.
    #[error("density {0} is outside 0..=1")]
    DensityOutOfRange(f64),
    /// Density run with no attempts.
    #[error("attempt_cap must be at least 1")]
    ZeroAttemptCap,
    /// Best-of run with no attempts.
    #[error("best_of_attempts must be at least 1")]
    ZeroBestOfAttempts,
}

/// Density must be a number in 0–1.
pub fn check_density(density: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&density) {
        Ok(())
    } else {
        Err(ConfigError::DensityOutOfRange(density))
    }
}

/// Validate a search configuration, returning all errors found.
pub fn validate_config(config: &SearchConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if let Err(e) = check_density(config.density) {
        errors.push(e);
    }
    if config.attempt_cap == 0 {
        errors.push(ConfigError::ZeroAttemptCap);
    }
    if config.best_of_attempts == 0 {
        errors.push(ConfigError::ZeroBestOfAttempts);
    }
    errors
}
