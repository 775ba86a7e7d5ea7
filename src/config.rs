use crate::control_system::traffic_light_controller::SignalStage;
use crate::error::ConfigurationError;
use crate::global_variables::*;
use crate::shared_data::Direction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable parameters for one simulation run.
///
/// Every field has a default, so a config file only needs the values it overrides:
///
/// ```json
/// { "light_cycle_period_ms": 3000, "yellow_duration_ms": 1000, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub motion_period_ms: u64,
    pub metrics_period_ms: u64,
    pub light_cycle_period_ms: u64,
    pub emergency_spawn_period_ms: u64,
    pub log_period_ms: u64,
    pub yellow_duration_ms: u64,
    pub emergency_spawn_probability: f64,
    pub emergency_lifetime_min_ms: u64,
    pub emergency_lifetime_max_ms: u64,
    pub initial_signal_stage: SignalStage,
    /// Approach that keeps green while an emergency vehicle is approaching.
    pub emergency_priority_direction: Direction,
    pub log_capacity: usize,
    pub chart_window: usize,
    pub vehicle_batch_min: usize,
    pub vehicle_batch_max: usize,
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Start with the two demo emergency records and the starter log lines.
    pub seed_demo_state: bool,
    pub start_running: bool,
    pub chart_output: Option<PathBuf>,
    pub log_csv_path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            motion_period_ms: MOTION_PERIOD_MS,
            metrics_period_ms: METRICS_PERIOD_MS,
            light_cycle_period_ms: LIGHT_CYCLE_PERIOD_MS,
            emergency_spawn_period_ms: EMERGENCY_SPAWN_PERIOD_MS,
            log_period_ms: LOG_PERIOD_MS,
            yellow_duration_ms: YELLOW_DURATION_MS,
            emergency_spawn_probability: EMERGENCY_SPAWN_PROBABILITY,
            emergency_lifetime_min_ms: EMERGENCY_LIFETIME_MIN_MS,
            emergency_lifetime_max_ms: EMERGENCY_LIFETIME_MAX_MS,
            initial_signal_stage: SignalStage::EastWestGreen,
            emergency_priority_direction: Direction::North,
            log_capacity: LOG_CAPACITY,
            chart_window: CHART_WINDOW,
            vehicle_batch_min: VEHICLE_BATCH_MIN,
            vehicle_batch_max: VEHICLE_BATCH_MAX,
            seed: None,
            seed_demo_state: true,
            start_running: true,
            chart_output: Some(PathBuf::from(CHART_OUTPUT_PATH)),
            log_csv_path: None,
        }
    }
}

impl SimulationConfig {
    /// Reads a JSON config file and validates it.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let config: SimulationConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given, otherwise the file at `path`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let periods = [
            ("motion_period_ms", self.motion_period_ms),
            ("metrics_period_ms", self.metrics_period_ms),
            ("light_cycle_period_ms", self.light_cycle_period_ms),
            ("emergency_spawn_period_ms", self.emergency_spawn_period_ms),
            ("log_period_ms", self.log_period_ms),
            ("yellow_duration_ms", self.yellow_duration_ms),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigurationError::ZeroPeriod { name });
            }
        }

        // A pending yellow must resolve before the next cycle tick.
        if self.yellow_duration_ms >= self.light_cycle_period_ms {
            return Err(ConfigurationError::YellowOutlastsCycle {
                yellow_ms: self.yellow_duration_ms,
                cycle_ms: self.light_cycle_period_ms,
            });
        }

        if !(0.0..=1.0).contains(&self.emergency_spawn_probability) {
            return Err(ConfigurationError::InvalidProbability {
                name: "emergency_spawn_probability",
                value: self.emergency_spawn_probability,
            });
        }

        if self.emergency_lifetime_min_ms >= self.emergency_lifetime_max_ms {
            return Err(ConfigurationError::EmptyRange {
                name: "emergency_lifetime_ms",
                min: self.emergency_lifetime_min_ms,
                max: self.emergency_lifetime_max_ms,
            });
        }

        if self.vehicle_batch_min >= self.vehicle_batch_max {
            return Err(ConfigurationError::EmptyRange {
                name: "vehicle_batch",
                min: self.vehicle_batch_min as u64,
                max: self.vehicle_batch_max as u64,
            });
        }

        if self.log_capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity {
                name: "log_capacity",
            });
        }
        if self.chart_window == 0 {
            return Err(ConfigurationError::ZeroCapacity {
                name: "chart_window",
            });
        }

        Ok(())
    }
}
