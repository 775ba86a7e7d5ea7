// Timer periods (milliseconds)
pub const MOTION_PERIOD_MS: u64 = 100;
pub const METRICS_PERIOD_MS: u64 = 2_000;
pub const LIGHT_CYCLE_PERIOD_MS: u64 = 5_000;
pub const EMERGENCY_SPAWN_PERIOD_MS: u64 = 8_000;
pub const LOG_PERIOD_MS: u64 = 4_000;
pub const YELLOW_DURATION_MS: u64 = 2_000;

// Emergency vehicles
pub const EMERGENCY_SPAWN_PROBABILITY: f64 = 0.3;
pub const EMERGENCY_LIFETIME_MIN_MS: u64 = 10_000;
pub const EMERGENCY_LIFETIME_MAX_MS: u64 = 30_000;
pub const EMERGENCY_DISTANCE_MIN_M: u32 = 200;
pub const EMERGENCY_DISTANCE_MAX_M: u32 = 1_000;
pub const EMERGENCY_ETA_MIN_S: u32 = 30;
pub const EMERGENCY_ETA_MAX_S: u32 = 90;

// Vehicle batches
pub const VEHICLE_BATCH_MIN: usize = 12;
pub const VEHICLE_BATCH_MAX: usize = 20;
pub const VEHICLE_FLAGGED_PROBABILITY: f64 = 0.1;
pub const VEHICLE_START_POSITION_MAX: f64 = 0.8;
pub const VEHICLE_SPEED: f64 = 0.01;
pub const VEHICLE_FLAGGED_SPEED: f64 = 0.015;

// Metrics draws
pub const TOTAL_VEHICLES_MIN: u32 = 150;
pub const TOTAL_VEHICLES_MAX: u32 = 170;
pub const AVG_WAIT_MIN_S: f64 = 38.0;
pub const AVG_WAIT_MAX_S: f64 = 48.0;
pub const QUEUE_SAMPLE_MIN: u32 = 5;
pub const QUEUE_SAMPLE_MAX: u32 = 20;
pub const DELAY_SAMPLE_MIN_S: u32 = 35;
pub const DELAY_SAMPLE_MAX_S: u32 = 55;

// Bounded buffers
pub const LOG_CAPACITY: usize = 20;
pub const CHART_WINDOW: usize = 7;

// Log feed messages
pub const INFO_MESSAGES: [&str; 4] = [
    "Traffic light cycle completed",
    "RL agent decision: Optimal timing applied",
    "Queue cleared on West approach",
    "Normal traffic flow detected",
];

pub const WARNING_MESSAGES: [&str; 3] = [
    "High queue detected on East approach",
    "Unusual traffic pattern observed",
    "Congestion building on South direction",
];

// Default chart export target
pub const CHART_OUTPUT_PATH: &str = "intersection_charts.png";
