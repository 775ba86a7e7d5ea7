use std::path::PathBuf;
use thiserror::Error;

/// Rejected simulation parameters.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("period `{name}` must be greater than zero")]
    ZeroPeriod { name: &'static str },

    #[error("yellow duration {yellow_ms} ms must be shorter than the light cycle period {cycle_ms} ms")]
    YellowOutlastsCycle { yellow_ms: u64, cycle_ms: u64 },

    #[error("probability `{name}` must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("range `{name}` is empty: [{min}, {max})")]
    EmptyRange { name: &'static str, min: u64, max: u64 },

    #[error("capacity `{name}` must be greater than zero")]
    ZeroCapacity { name: &'static str },

    #[error("cannot read configuration file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A render call that could not be delivered. Always non-fatal to the simulation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render target `{0}` is not available")]
    TargetMissing(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart error: {0}")]
    Chart(String),
}

/// Top-level error for starting and driving a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
