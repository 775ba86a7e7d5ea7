// benches/bench_event_queue.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use intersection_monitor::config::SimulationConfig;
use intersection_monitor::monitoring::render_surface::RecordingSurface;
use intersection_monitor::shared_data::SimTime;
use intersection_monitor::simulation_engine::events::{EventQueue, SimEvent};
use intersection_monitor::simulation_engine::simulation::Simulation;
use std::time::Duration;

fn bench_event_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_queue");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    group.bench_function("schedule_and_drain_1000", |b| {
        b.iter(|| {
            let mut queue = EventQueue::new();
            for i in 0..1_000u64 {
                queue.schedule(SimTime((i * 37) % 5_000), SimEvent::MoveVehicles);
            }
            while let Some(event) = queue.pop_due(SimTime(5_000)) {
                black_box(event);
            }
        });
    });

    // One simulated minute with every timer live.
    group.bench_function("simulate_one_minute", |b| {
        b.iter(|| {
            let config = SimulationConfig {
                seed: Some(11),
                chart_output: None,
                ..SimulationConfig::default()
            };
            let Ok(mut simulation) = Simulation::new(config, RecordingSurface::new()) else {
                return;
            };
            simulation.start();
            simulation.advance_to(SimTime(60_000));
            black_box(simulation.snapshot());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_event_queue);
criterion_main!(benches);
