//! Live-tunable simulation settings.
//!
//! [`SimulationConfig`] is passed explicitly into every build and tick. Only
//! `dot_size` is structural: changing it requires a rebuild of the particle
//! field. `bass_multiplier` and `chaos_strength` take effect on the next tick.
//!
//! Presets can be stored as JSON:
//!
//! ```ignore
//! let config = SimulationConfig::default().with_chaos_strength(4.0);
//! config.save("preset.json")?;
//! let loaded = SimulationConfig::load("preset.json")?;
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_dot_size() -> u32 {
    16
}

fn default_bass_multiplier() -> f32 {
    1.5
}

fn default_chaos_strength() -> f32 {
    2.5
}

/// Settings read by the sampler and the force integrator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Sampling step hint in pixels. Also drives particle base size.
    #[serde(default = "default_dot_size")]
    pub dot_size: u32,
    /// Gain applied to the bass energy before it is mapped to a force.
    #[serde(default = "default_bass_multiplier")]
    pub bass_multiplier: f32,
    /// Gain on the procedural noise force.
    #[serde(default = "default_chaos_strength")]
    pub chaos_strength: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dot_size: default_dot_size(),
            bass_multiplier: default_bass_multiplier(),
            chaos_strength: default_chaos_strength(),
        }
    }
}

impl SimulationConfig {
    /// Set the sampling dot size in pixels.
    pub fn with_dot_size(mut self, dot_size: u32) -> Self {
        self.dot_size = dot_size;
        self
    }

    /// Set the bass gain.
    pub fn with_bass_multiplier(mut self, multiplier: f32) -> Self {
        self.bass_multiplier = multiplier;
        self
    }

    /// Set the noise gain.
    pub fn with_chaos_strength(mut self, strength: f32) -> Self {
        self.chaos_strength = strength;
        self
    }

    /// Check every value is inside its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dot_size == 0 {
            return Err(ConfigError::Invalid("dot_size must be positive".into()));
        }
        if !self.bass_multiplier.is_finite() || self.bass_multiplier <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "bass_multiplier must be a positive number, got {}",
                self.bass_multiplier
            )));
        }
        if !self.chaos_strength.is_finite() || self.chaos_strength < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "chaos_strength must be non-negative, got {}",
                self.chaos_strength
            )));
        }
        Ok(())
    }

    /// Whether switching from `self` to `other` requires rebuilding particles.
    pub fn needs_rebuild(&self, other: &SimulationConfig) -> bool {
        self.dot_size != other.dot_size
    }

    /// Write this configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from JSON. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
