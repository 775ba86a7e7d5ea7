use crate::config::SimulationConfig;
use crate::control_system::traffic_light_controller::{
    CycleOutcome, SignalStage, TrafficLightController,
};
use crate::monitoring::log_buffer::LogBuffer;
use crate::monitoring::metrics::{random_log_message, sample_metrics, MetricsReport};
use crate::shared_data::{LightMap, LogEntry, Severity, SimTime};
use crate::simulation_engine::emergency::{
    EmergencyKind, EmergencyRegistry, EmergencyStatus, EmergencyVehicle,
};
use crate::simulation_engine::vehicles::{advance_all, generate_batch, Vehicle};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Serialisable view of the whole simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub time: SimTime,
    pub running: bool,
    pub stage: SignalStage,
    pub lights: LightMap,
    pub vehicles: Vec<Vehicle>,
    pub emergencies: Vec<EmergencyVehicle>,
    pub logs: Vec<LogEntry>,
}

/// Sole owner of the mutable simulation data. Timer handlers reach it only through
/// these methods.
///
/// The run flag belongs to the engine; outside the crate it cannot be cleared directly:
///
/// ```compile_fail
/// use intersection_monitor::config::SimulationConfig;
/// use intersection_monitor::simulation_engine::state::SimulationState;
///
/// let mut state = SimulationState::new(&SimulationConfig::default());
/// state.set_running(false);
/// ```
#[derive(Debug)]
pub struct SimulationState {
    rng: SmallRng,
    clock: SimTime,
    running: bool,
    vehicles: Vec<Vehicle>,
    lights: TrafficLightController,
    emergencies: EmergencyRegistry,
    logs: LogBuffer,
    fresh_logs: Vec<LogEntry>,
    spawn_probability: f64,
    lifetime_ms: (u64, u64),
    batch_size: (usize, usize),
}

impl SimulationState {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            rng,
            clock: SimTime::default(),
            running: config.start_running,
            vehicles: Vec::new(),
            lights: TrafficLightController::new(
                config.initial_signal_stage,
                config.emergency_priority_direction,
            ),
            emergencies: EmergencyRegistry::new(),
            logs: LogBuffer::new(config.log_capacity),
            fresh_logs: Vec::new(),
            spawn_probability: config.emergency_spawn_probability,
            lifetime_ms: (
                config.emergency_lifetime_min_ms,
                config.emergency_lifetime_max_ms,
            ),
            batch_size: (config.vehicle_batch_min, config.vehicle_batch_max),
        }
    }

    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub(crate) fn set_clock(&mut self, now: SimTime) {
        self.clock = now;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Only `Simulation::pause` and `Simulation::resume` flip this, so held timers stay
    /// in step with the flag.
    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Seeds the two demo emergency records and the starter log lines. Returns the
    /// ids of the seeded records with their self-destruct delays.
    pub fn seed_demo(&mut self) -> Vec<(String, u64)> {
        let seeded = [
            self.emergencies.register(
                EmergencyKind::Ambulance,
                "400m North",
                45,
                EmergencyStatus::Approaching,
            ),
            self.emergencies.register(
                EmergencyKind::FireTruck,
                "800m East",
                90,
                EmergencyStatus::EnRoute,
            ),
        ];

        self.push_log(Severity::Info, "Traffic light cycle completed - North direction");
        self.push_log(Severity::Warning, "High queue detected on East approach");
        self.push_log(
            Severity::Critical,
            format!("Emergency vehicle {} detected - Priority mode activated", seeded[0].id),
        );
        self.push_log(Severity::Info, "RL agent decision: Extend green for North");

        seeded
            .into_iter()
            .map(|ev| (ev.id, self.draw_emergency_lifetime()))
            .collect()
    }

    /// Replaces the vehicle list with a fresh random batch.
    pub fn regenerate_vehicles(&mut self) {
        let (min, max) = self.batch_size;
        let count = self.rng.random_range(min..max);
        self.vehicles = generate_batch(&mut self.rng, count);
    }

    pub fn replace_vehicles(&mut self, vehicles: Vec<Vehicle>) {
        self.vehicles = vehicles;
    }

    pub fn advance_vehicles(&mut self) {
        advance_all(&mut self.vehicles);
    }

    /// One light-cycle tick; logs the emergency override when it applies.
    pub fn cycle_lights(&mut self) -> CycleOutcome {
        let outcome = self.lights.cycle(self.emergencies.has_approaching());
        if let CycleOutcome::EmergencyOverride(direction) = outcome {
            self.push_log(
                Severity::Critical,
                format!(
                    "Emergency priority activated - All lights red except {}",
                    direction
                ),
            );
        }
        outcome
    }

    pub fn complete_light_transition(&mut self, from: SignalStage, to: SignalStage) -> bool {
        self.lights.complete_transition(from, to)
    }

    /// Draws the spawn chance; on success registers an approaching vehicle and returns
    /// it with its self-destruct delay.
    pub fn maybe_spawn_emergency(&mut self) -> Option<(EmergencyVehicle, u64)> {
        if !self.rng.random_bool(self.spawn_probability) {
            return None;
        }
        let vehicle = self.emergencies.spawn_random(&mut self.rng);
        self.push_log(
            Severity::Critical,
            format!("Emergency vehicle {} detected - {}", vehicle.id, vehicle.kind),
        );
        info!("Emergency vehicle {} spawned ({})", vehicle.id, vehicle.kind);
        let lifetime = self.draw_emergency_lifetime();
        Some((vehicle, lifetime))
    }

    /// Registers a vehicle with explicit attributes, logged like a random spawn.
    pub fn admit_emergency(
        &mut self,
        kind: EmergencyKind,
        location: impl Into<String>,
        eta_secs: u32,
        status: EmergencyStatus,
    ) -> (EmergencyVehicle, u64) {
        let vehicle = self.emergencies.register(kind, location, eta_secs, status);
        self.push_log(
            Severity::Critical,
            format!("Emergency vehicle {} detected - {}", vehicle.id, vehicle.kind),
        );
        let lifetime = self.draw_emergency_lifetime();
        (vehicle, lifetime)
    }

    fn draw_emergency_lifetime(&mut self) -> u64 {
        let (min, max) = self.lifetime_ms;
        self.rng.random_range(min..max)
    }

    /// Drops the vehicle and logs its clearance. `None` when it is already gone.
    pub fn clear_emergency(&mut self, id: &str) -> Option<EmergencyVehicle> {
        let vehicle = self.emergencies.remove(id)?;
        self.push_log(
            Severity::Info,
            format!("Emergency vehicle {} cleared intersection", vehicle.id),
        );
        info!("Emergency vehicle {} cleared", vehicle.id);
        Some(vehicle)
    }

    pub fn report_metrics(&mut self) -> MetricsReport {
        sample_metrics(&mut self.rng, self.emergencies.len())
    }

    pub fn emit_random_log(&mut self) -> LogEntry {
        let (severity, message) = random_log_message(&mut self.rng);
        self.push_log(severity, message)
    }

    pub fn push_log(&mut self, severity: Severity, message: impl Into<String>) -> LogEntry {
        let entry = LogEntry::new(self.clock, severity, message);
        self.logs.push(entry.clone());
        self.fresh_logs.push(entry.clone());
        entry
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
        self.fresh_logs.clear();
    }

    /// Entries logged since the last call, oldest first.
    pub fn take_fresh_logs(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.fresh_logs)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn lights(&self) -> LightMap {
        self.lights.lights()
    }

    pub fn signal_stage(&self) -> SignalStage {
        self.lights.stage()
    }

    pub fn emergencies(&self) -> &[EmergencyVehicle] {
        self.emergencies.active()
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            time: self.clock,
            running: self.running,
            stage: self.lights.stage(),
            lights: self.lights.lights(),
            vehicles: self.vehicles.clone(),
            emergencies: self.emergencies.active().to_vec(),
            logs: self.logs.to_vec(),
        }
    }
}
