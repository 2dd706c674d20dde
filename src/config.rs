//! Placer configuration.
//!
//! Configuration is plain JSON; every field is optional and falls back to
//! its default:
//!
//! ```json
//! {
//!     "net_model": {
//!         "epsilon": 0.001,
//!         "weight_merge": "overwrite",
//!         "fixed_anchor": "lower_left"
//!     },
//!     "rounds": 1,
//!     "snapshot_each_round": false
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlacerError, Result};
use crate::solver::DEFAULT_EPSILON;

/// What to do when two pin pairs produce the same weight key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMerge {
    /// The later weight replaces the earlier one
    #[default]
    Overwrite,
    /// Weights for the same key are summed
    Accumulate,
}

/// Point of a fixed module that free pins are pulled towards.
///
/// Pin offsets are measured from the module centre in both cases; only the
/// fixed module's base position changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedAnchor {
    /// The fixed module's lower-left corner, as stored in the `.pl` file
    #[default]
    LowerLeft,
    /// The fixed module's centre
    Center,
}

/// Settings for the bound-to-bound net model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetModelConfig {
    /// Minimum separation (exclusive) between an interior pin and a boundary
    /// pin for the pair to get a weight.
    pub epsilon: f64,
    /// Policy for repeated weight keys.
    pub weight_merge: WeightMerge,
    /// Fixed-module position used in free/fixed springs.
    pub fixed_anchor: FixedAnchor,
}

impl Default for NetModelConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            weight_merge: WeightMerge::default(),
            fixed_anchor: FixedAnchor::default(),
        }
    }
}

impl NetModelConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pin separation threshold.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the weight merge policy.
    pub fn with_weight_merge(mut self, weight_merge: WeightMerge) -> Self {
        self.weight_merge = weight_merge;
        self
    }

    /// Set the fixed-module anchor.
    pub fn with_fixed_anchor(mut self, fixed_anchor: FixedAnchor) -> Self {
        self.fixed_anchor = fixed_anchor;
        self
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(PlacerError::config(format!(
                "net_model.epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Configuration for a placement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacerConfig {
    /// Net model settings.
    pub net_model: NetModelConfig,
    /// Number of weight, solve and write rounds.
    pub rounds: usize,
    /// Write a versioned snapshot after every round, not just the last.
    pub snapshot_each_round: bool,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            net_model: NetModelConfig::default(),
            rounds: 1,
            snapshot_each_round: false,
        }
    }
}

impl PlacerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the net model settings.
    pub fn with_net_model(mut self, net_model: NetModelConfig) -> Self {
        self.net_model = net_model;
        self
    }

    /// Set the number of rounds.
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Enable or disable per-round snapshots.
    pub fn with_snapshot_each_round(mut self, enabled: bool) -> Self {
        self.snapshot_each_round = enabled;
        self
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        self.net_model.validate()?;
        if self.rounds == 0 {
            return Err(PlacerError::config("rounds must be at least 1"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: PlacerConfig =
            serde_json::from_str(content).map_err(|e| PlacerError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PlacerError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }
}
