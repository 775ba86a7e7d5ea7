// event_stream_main.rs
use intersection_monitor::config::SimulationConfig;
use intersection_monitor::error::SimulationError;
use intersection_monitor::monitoring::admin_cli::run_cli;
use intersection_monitor::monitoring::render_surface::JsonEventSurface;
use intersection_monitor::simulation_engine::simulation::{spawn_simulation, Simulation};
use log::error;
use std::path::PathBuf;
use tokio::io::BufReader;

/// Streams every render call to stdout as JSON lines; the admin menu goes to stderr.
#[tokio::main]
async fn main() -> Result<(), SimulationError> {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = SimulationConfig::load(config_path.as_deref())?;

    let simulation = Simulation::new(config, JsonEventSurface::new(std::io::stdout()))?;
    let (handle, task) = spawn_simulation(simulation);

    let stdin = BufReader::new(tokio::io::stdin());
    run_cli(stdin, &mut std::io::stderr(), &handle).await?;

    if let Err(e) = task.await {
        error!("Simulation task failed: {}", e);
    }
    Ok(())
}
