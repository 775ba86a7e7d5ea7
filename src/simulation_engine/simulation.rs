// simulation.rs
use crate::config::SimulationConfig;
use crate::control_system::traffic_light_controller::CycleOutcome;
use crate::error::{ConfigurationError, RenderError};
use crate::monitoring::render_surface::{ChartSeries, RenderSurface};
use crate::shared_data::SimTime;
use crate::simulation_engine::emergency::{EmergencyKind, EmergencyStatus, EmergencyVehicle};
use crate::simulation_engine::events::{EventQueue, ScheduledEvent, SimEvent};
use crate::simulation_engine::state::{SimulationSnapshot, SimulationState};
use log::{debug, info, trace, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

/// Operator actions delivered to the task that owns the simulation.
#[derive(Debug)]
pub enum SimulationCommand {
    Start,
    Pause,
    ClearLogs,
    RegenerateVehicles,
    ExportCharts,
    Snapshot(oneshot::Sender<SimulationSnapshot>),
    Shutdown,
}

fn skip_on_error(target: &str, result: Result<(), RenderError>) {
    if let Err(e) = result {
        warn!("Skipping {} render: {}", target, e);
    }
}

/// The intersection simulation: owned state, its event queue and a render surface.
///
/// Time is virtual. `advance_to` processes every event due up to the given instant in
/// due order, so the same seed and the same calls always give the same result.
pub struct Simulation<S: RenderSurface> {
    config: SimulationConfig,
    state: SimulationState,
    queue: EventQueue,
    surface: S,
    now: SimTime,
    started: bool,
    paused_at: Option<SimTime>,
    // One-shot events that came due while paused, with their remaining delay.
    held: Vec<(u64, SimEvent)>,
}

impl<S: RenderSurface> Simulation<S> {
    pub fn new(config: SimulationConfig, surface: S) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let state = SimulationState::new(&config);
        let paused_at = if config.start_running {
            None
        } else {
            Some(SimTime::default())
        };
        Ok(Self {
            config,
            state,
            queue: EventQueue::new(),
            surface,
            now: SimTime::default(),
            started: false,
            paused_at,
            held: Vec::new(),
        })
    }

    /// Generates the first vehicle batch, seeds demo data, arms the five periodic
    /// timers and pushes an initial full render. Calling it again does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        self.state.regenerate_vehicles();
        if self.config.seed_demo_state {
            for (id, lifetime) in self.state.seed_demo() {
                self.schedule_in(lifetime, SimEvent::ClearEmergency { id });
            }
        }

        for event in [
            SimEvent::MoveVehicles,
            SimEvent::ReportMetrics,
            SimEvent::CycleLights,
            SimEvent::SpawnEmergency,
            SimEvent::EmitLog,
        ] {
            let period = self.period_of(&event);
            self.schedule_in(period, event);
        }

        info!(
            "Simulation started with {} vehicles (running: {})",
            self.state.vehicles().len(),
            self.state.is_running()
        );
        self.render_all();
    }

    fn period_of(&self, event: &SimEvent) -> u64 {
        match event {
            SimEvent::MoveVehicles => self.config.motion_period_ms,
            SimEvent::ReportMetrics => self.config.metrics_period_ms,
            SimEvent::CycleLights => self.config.light_cycle_period_ms,
            SimEvent::SpawnEmergency => self.config.emergency_spawn_period_ms,
            SimEvent::EmitLog => self.config.log_period_ms,
            SimEvent::CompleteLightTransition { .. } | SimEvent::ClearEmergency { .. } => 0,
        }
    }

    fn schedule_in(&mut self, delay_ms: u64, event: SimEvent) {
        self.queue.schedule(SimTime(self.now.0 + delay_ms), event);
    }

    /// Processes every event due at or before `target`, then moves the clock there.
    pub fn advance_to(&mut self, target: SimTime) {
        while let Some(scheduled) = self.queue.pop_due(target) {
            self.now = self.now.max(scheduled.due);
            self.state.set_clock(self.now);
            self.dispatch(scheduled);
        }
        self.now = self.now.max(target);
        self.state.set_clock(self.now);
    }

    /// Advances the clock by `delta_ms`.
    pub fn advance_by(&mut self, delta_ms: u64) {
        self.advance_to(SimTime(self.now.0 + delta_ms));
    }

    fn dispatch(&mut self, scheduled: ScheduledEvent) {
        let ScheduledEvent { due, event, .. } = scheduled;

        if event.is_periodic() {
            // Timers keep firing while paused; only their work is skipped.
            let period = self.period_of(&event);
            self.queue.schedule(SimTime(due.0 + period), event.clone());
            if !self.state.is_running() {
                trace!("Paused; skipping {:?}", event);
                return;
            }
        } else if let Some(paused_at) = self.paused_at {
            let remaining = due.0.saturating_sub(paused_at.0);
            debug!("Paused; holding {:?} ({} ms remaining)", event, remaining);
            self.held.push((remaining, event));
            return;
        }

        match event {
            SimEvent::MoveVehicles => {
                self.state.advance_vehicles();
                skip_on_error("vehicles", self.surface.render_vehicles(self.state.vehicles()));
            }
            SimEvent::ReportMetrics => {
                let report = self.state.report_metrics();
                debug!(
                    "Metrics: {} vehicles, {} emergencies, {:.1}s wait",
                    report.total_vehicles, report.emergency_active, report.avg_wait_time
                );
                skip_on_error("metrics", self.surface.render_metrics(&report));
                for &(direction, queue) in &report.queue_lengths {
                    skip_on_error(
                        "chart",
                        self.surface
                            .push_chart_sample(ChartSeries::QueueLength(direction), queue as f64),
                    );
                }
                for &(direction, delay) in &report.approach_delays {
                    skip_on_error(
                        "chart",
                        self.surface
                            .push_chart_sample(ChartSeries::Delay(direction), delay as f64),
                    );
                }
            }
            SimEvent::CycleLights => {
                if let CycleOutcome::Transition { from, to } = self.state.cycle_lights() {
                    self.schedule_in(
                        self.config.yellow_duration_ms,
                        SimEvent::CompleteLightTransition { from, to },
                    );
                }
                skip_on_error("lights", self.surface.render_lights(&self.state.lights()));
                self.flush_logs();
            }
            SimEvent::SpawnEmergency => {
                if let Some((vehicle, lifetime)) = self.state.maybe_spawn_emergency() {
                    self.schedule_in(lifetime, SimEvent::ClearEmergency { id: vehicle.id });
                    skip_on_error(
                        "emergency list",
                        self.surface.render_emergency_list(self.state.emergencies()),
                    );
                    self.flush_logs();
                }
            }
            SimEvent::EmitLog => {
                self.state.emit_random_log();
                self.flush_logs();
            }
            SimEvent::CompleteLightTransition { from, to } => {
                if self.state.complete_light_transition(from, to) {
                    skip_on_error("lights", self.surface.render_lights(&self.state.lights()));
                }
            }
            SimEvent::ClearEmergency { id } => {
                if self.state.clear_emergency(&id).is_some() {
                    skip_on_error(
                        "emergency list",
                        self.surface.render_emergency_list(self.state.emergencies()),
                    );
                    self.flush_logs();
                }
            }
        }
    }

    fn flush_logs(&mut self) {
        let fresh = self.state.take_fresh_logs();
        if fresh.is_empty() {
            return;
        }
        for entry in &fresh {
            skip_on_error("log entry", self.surface.append_log_entry(entry));
        }
        skip_on_error("log history", self.surface.render_log_history(self.state.logs()));
    }

    fn render_all(&mut self) {
        skip_on_error("lights", self.surface.render_lights(&self.state.lights()));
        skip_on_error("vehicles", self.surface.render_vehicles(self.state.vehicles()));
        skip_on_error(
            "emergency list",
            self.surface.render_emergency_list(self.state.emergencies()),
        );
        self.flush_logs();
    }

    /// Resumes timer work. Pending and held timers restart with the delay they had left
    /// when the simulation was paused.
    pub fn resume(&mut self) {
        if self.state.is_running() {
            return;
        }
        self.state.set_running(true);
        let paused_at = self.paused_at.take().unwrap_or(self.now);

        // Shifting the whole timeline keeps cycle ticks behind a held yellow completion.
        let mut restarts: Vec<(u64, SimEvent)> = self
            .queue
            .drain_in_order()
            .into_iter()
            .map(|scheduled| {
                let ahead = scheduled.due.0.saturating_sub(paused_at.0);
                let remaining = if scheduled.event.is_periodic() {
                    let period = self.period_of(&scheduled.event);
                    (ahead.saturating_sub(1) % period) + 1
                } else {
                    ahead
                };
                (remaining, scheduled.event)
            })
            .collect();
        restarts.append(&mut self.held);
        // Stable sort keeps schedule order between equal delays.
        restarts.sort_by_key(|(remaining, _)| *remaining);

        for (remaining, event) in restarts {
            self.schedule_in(remaining, event);
        }
        info!(
            "Simulation running at {} after {} ms paused",
            self.now,
            self.now.0.saturating_sub(paused_at.0)
        );
    }

    pub fn pause(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.set_running(false);
        self.paused_at = Some(self.now);
        info!("Simulation paused at {}", self.now);
    }

    pub fn clear_logs(&mut self) {
        self.state.clear_logs();
        skip_on_error("log history", self.surface.render_log_history(self.state.logs()));
    }

    pub fn regenerate_vehicles(&mut self) {
        self.state.regenerate_vehicles();
        skip_on_error("vehicles", self.surface.render_vehicles(self.state.vehicles()));
    }

    /// Adds an emergency vehicle with explicit attributes and arms its self-destruct
    /// timer, exactly like a random spawn.
    pub fn add_emergency(
        &mut self,
        kind: EmergencyKind,
        location: impl Into<String>,
        eta_secs: u32,
        status: EmergencyStatus,
    ) -> (EmergencyVehicle, u64) {
        let (vehicle, lifetime) = self.state.admit_emergency(kind, location, eta_secs, status);
        self.schedule_in(lifetime, SimEvent::ClearEmergency {
            id: vehicle.id.clone(),
        });
        skip_on_error(
            "emergency list",
            self.surface.render_emergency_list(self.state.emergencies()),
        );
        self.flush_logs();
        (vehicle, lifetime)
    }

    pub fn export_charts(&mut self) {
        match self.surface.export_charts() {
            Ok(paths) => {
                for path in paths {
                    info!("Exported chart {}", path.display());
                }
            }
            Err(e) => warn!("Chart export skipped: {}", e),
        }
    }

    /// Applies one command. Returns `false` once the simulation should stop.
    pub fn handle_command(&mut self, command: SimulationCommand) -> bool {
        match command {
            SimulationCommand::Start => self.resume(),
            SimulationCommand::Pause => self.pause(),
            SimulationCommand::ClearLogs => self.clear_logs(),
            SimulationCommand::RegenerateVehicles => self.regenerate_vehicles(),
            SimulationCommand::ExportCharts => self.export_charts(),
            SimulationCommand::Snapshot(reply) => {
                if reply.send(self.state.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
            SimulationCommand::Shutdown => {
                info!("Simulation shutting down at {}", self.now);
                return false;
            }
        }
        true
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<SimTime> {
        self.queue.next_due()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn held_events(&self) -> usize {
        self.held.len()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        self.state.snapshot()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

/// Drives the simulation on wall-clock time until `Shutdown` arrives or every command
/// sender is dropped. Returns the simulation for inspection.
pub async fn run_simulation<S: RenderSurface>(
    mut simulation: Simulation<S>,
    mut commands: mpsc::Receiver<SimulationCommand>,
) -> Simulation<S> {
    let origin = Instant::now();
    simulation.start();

    loop {
        let next_due = simulation
            .next_due()
            .unwrap_or(SimTime(simulation.now().0 + simulation.config().motion_period_ms));
        let deadline = origin + Duration::from_millis(next_due.as_millis());

        tokio::select! {
            _ = sleep_until(deadline) => simulation.advance_to(next_due),
            command = commands.recv() => {
                let elapsed = SimTime(origin.elapsed().as_millis() as u64);
                simulation.advance_to(elapsed);
                match command {
                    Some(command) => {
                        if !simulation.handle_command(command) {
                            break;
                        }
                    }
                    None => {
                        info!("Command channel closed; stopping simulation");
                        break;
                    }
                }
            }
        }
    }

    simulation
}

/// Cloneable sender side for a simulation running on its own task.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    commands: mpsc::Sender<SimulationCommand>,
}

impl SimulationHandle {
    pub fn new(commands: mpsc::Sender<SimulationCommand>) -> Self {
        Self { commands }
    }

    /// Sends a command; `false` when the simulation task is gone.
    pub async fn send(&self, command: SimulationCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    pub async fn start(&self) -> bool {
        self.send(SimulationCommand::Start).await
    }

    pub async fn pause(&self) -> bool {
        self.send(SimulationCommand::Pause).await
    }

    pub async fn clear_logs(&self) -> bool {
        self.send(SimulationCommand::ClearLogs).await
    }

    pub async fn regenerate_vehicles(&self) -> bool {
        self.send(SimulationCommand::RegenerateVehicles).await
    }

    pub async fn export_charts(&self) -> bool {
        self.send(SimulationCommand::ExportCharts).await
    }

    pub async fn snapshot(&self) -> Option<SimulationSnapshot> {
        let (reply, response) = oneshot::channel();
        if !self.send(SimulationCommand::Snapshot(reply)).await {
            return None;
        }
        response.await.ok()
    }

    pub async fn shutdown(&self) -> bool {
        self.send(SimulationCommand::Shutdown).await
    }
}

/// Spawns the simulation onto the tokio runtime.
pub fn spawn_simulation<S>(simulation: Simulation<S>) -> (SimulationHandle, JoinHandle<Simulation<S>>)
where
    S: RenderSurface + Send + 'static,
{
    let (tx, rx) = mpsc::channel(32);
    let task = tokio::spawn(run_simulation(simulation, rx));
    (SimulationHandle::new(tx), task)
}
