// simulation_main.rs
use intersection_monitor::config::SimulationConfig;
use intersection_monitor::error::SimulationError;
use intersection_monitor::monitoring::admin_cli::run_cli;
use intersection_monitor::monitoring::charts::ChartSurface;
use intersection_monitor::monitoring::render_surface::{
    ConsoleSurface, CsvLogSurface, FanoutSurface,
};
use intersection_monitor::simulation_engine::simulation::{spawn_simulation, Simulation};
use log::{error, info};
use std::path::PathBuf;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), SimulationError> {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = SimulationConfig::load(config_path.as_deref())?;

    let mut surface = FanoutSurface::new()
        .with(ConsoleSurface)
        .with(ChartSurface::new(config.chart_window, config.chart_output.clone()));
    if let Some(path) = &config.log_csv_path {
        surface = surface.with(CsvLogSurface::append_to(path)?);
        info!("Appending log feed to {}", path.display());
    }

    let simulation = Simulation::new(config, surface)?;
    let (handle, task) = spawn_simulation(simulation);

    let stdin = BufReader::new(tokio::io::stdin());
    run_cli(stdin, &mut std::io::stdout(), &handle).await?;

    match task.await {
        Ok(simulation) => info!("Simulation stopped at {}", simulation.now()),
        Err(e) => error!("Simulation task failed: {}", e),
    }
    Ok(())
}
