use intersection_monitor::config::SimulationConfig;
use intersection_monitor::monitoring::admin_cli::run_cli;
use intersection_monitor::monitoring::render_surface::RecordingSurface;
use intersection_monitor::shared_data::SimTime;
use intersection_monitor::simulation_engine::simulation::{spawn_simulation, Simulation};
use std::time::Duration;

fn quiet_simulation() -> Simulation<RecordingSurface> {
    let config = SimulationConfig {
        seed: Some(5),
        seed_demo_state: false,
        emergency_spawn_probability: 0.0,
        chart_output: None,
        ..SimulationConfig::default()
    };
    Simulation::new(config, RecordingSurface::new()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn runner_follows_the_tokio_clock() {
    let (handle, task) = spawn_simulation(quiet_simulation());

    tokio::time::sleep(Duration::from_millis(5_050)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.time >= SimTime(5_000));
    assert!(snapshot.running);
    assert_eq!(snapshot.lights.east, intersection_monitor::shared_data::LightPhase::Yellow);

    assert!(handle.shutdown().await);
    let simulation = task.await.unwrap();
    assert!(simulation.now() >= SimTime(5_000));
}

#[tokio::test(start_paused = true)]
async fn paused_runner_keeps_state_still() {
    let (handle, task) = spawn_simulation(quiet_simulation());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(handle.pause().await);
    let before = handle.snapshot().await.unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    let after = handle.snapshot().await.unwrap();
    assert_eq!(before.vehicles, after.vehicles);
    assert_eq!(before.logs, after.logs);
    assert!(!after.running);

    assert!(handle.start().await);
    tokio::time::sleep(Duration::from_millis(500)).await;
    let resumed = handle.snapshot().await.unwrap();
    assert_ne!(after.vehicles, resumed.vehicles);

    handle.shutdown().await;
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_runner() {
    let (handle, task) = spawn_simulation(quiet_simulation());
    tokio::time::sleep(Duration::from_millis(300)).await;
    drop(handle);
    let simulation = task.await.unwrap();
    assert!(simulation.now() >= SimTime(300));
}

#[tokio::test(start_paused = true)]
async fn cli_pauses_reports_and_exits() {
    let (handle, task) = spawn_simulation(quiet_simulation());

    let mut out = Vec::new();
    run_cli(&b"2\n6\n9\n7\n"[..], &mut out, &handle).await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Simulation paused."));
    assert!(text.contains("\"running\": false"));
    assert!(text.contains("Invalid choice. Try again."));
    assert!(text.contains("Exiting CLI."));

    let simulation = task.await.unwrap();
    assert!(!simulation.is_running());
}

#[tokio::test(start_paused = true)]
async fn cli_clears_the_log_feed() {
    let (handle, task) = spawn_simulation(quiet_simulation());
    tokio::time::sleep(Duration::from_secs(9)).await;

    let mut out = Vec::new();
    run_cli(&b"3\n"[..], &mut out, &handle).await.unwrap();

    let simulation = task.await.unwrap();
    assert!(simulation.state().logs().is_empty());
}
