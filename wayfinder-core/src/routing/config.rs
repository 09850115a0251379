use serde::{Deserialize, Serialize};

use crate::Error;

/// Per-request search settings shared by every request of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max distance (m) from a custom location to the nearest space when no space contains it
    pub anchor_tolerance: f64,
    /// Cost factor for edges touching visible restricted nodes
    /// (`restrictions=avoid` multiplies, `prefer` divides)
    pub restriction_penalty: f64,
    /// Walking speed (m/s) at multiplier 1.0
    pub base_walk_speed: f64,
    /// Settled nodes between two cancellation checks
    pub cancel_check_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anchor_tolerance: 1.0,
            restriction_penalty: 4.0,
            base_walk_speed: 1.0,
            cancel_check_interval: 256,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.anchor_tolerance.is_finite() || self.anchor_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "anchor_tolerance must be a non-negative number, got {}",
                self.anchor_tolerance
            )));
        }
        if !self.restriction_penalty.is_finite() || self.restriction_penalty <= 1.0 {
            return Err(Error::Config(format!(
                "restriction_penalty must be greater than 1, got {}",
                self.restriction_penalty
            )));
        }
        if !self.base_walk_speed.is_finite() || self.base_walk_speed <= 0.0 {
            return Err(Error::Config(format!(
                "base_walk_speed must be positive, got {}",
                self.base_walk_speed
            )));
        }
        if self.cancel_check_interval == 0 {
            return Err(Error::Config(
                "cancel_check_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
