//! Tunable parameters of the planners and the slot scanner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed parsing configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters shared by the trajectory planners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// The speed driven along every path segment, in m/s.
    pub max_speed: f64,
    /// The desired acceleration in m/s<sup>2</sup>.
    pub desired_acceleration: f64,
    /// How far from the slot, laterally, a vehicle leaving a parallel slot ends up, in m.
    pub leave_lane_offset: f64,
    /// Gap kept to the cars before and behind a parallel slot, in m.
    pub clearance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_speed: 1.0,
            desired_acceleration: 1.0,
            leave_lane_offset: 5.0,
            clearance: 0.05,
        }
    }
}

/// Parameters of the empty slot scanner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Speed while scanning, in m/s.
    pub scan_speed: f64,
    /// A gap at least this long is accepted without waiting for the next car, in m.
    pub sufficient_length: f64,
    /// Depth of a detected slot, in m.
    pub slot_width: f64,
    /// Lateral distance from the scanning vehicle to the detected slot, in m.
    pub lateral_offset: f64,
    /// Distance after which the scan gives up, in m.
    pub max_scan_distance: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_speed: 2.0,
            sufficient_length: 6.4,
            slot_width: 2.0,
            lateral_offset: 5.0,
            max_scan_distance: 42.5,
        }
    }
}

/// All tunables of a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub planner: PlannerConfig,
    pub scan: ScanConfig,
}

impl SimulationConfig {
    /// Parses a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
