use serde::{Deserialize, Serialize};

use crate::Error;

/// Tolerances used while turning map data into a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Distance (m) within which an altitude area is eligible for a node
    pub altitude_tolerance: f64,
    /// Radius (m) of the probe disk used to compare altitude area overlaps
    pub altitude_buffer_radius: f64,
    /// Distance (m) within which a node without authored space is assigned to one
    pub node_space_tolerance: f64,
    /// Spacing (m) of the floor altitude samples taken along same-level edges
    pub edge_sample_spacing: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            altitude_tolerance: 0.05,
            altitude_buffer_radius: 0.1,
            node_space_tolerance: 0.05,
            edge_sample_spacing: 0.5,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let tolerances = [
            ("altitude_tolerance", self.altitude_tolerance),
            ("node_space_tolerance", self.node_space_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let positive = [
            ("altitude_buffer_radius", self.altitude_buffer_radius),
            ("edge_sample_spacing", self.edge_sample_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}
