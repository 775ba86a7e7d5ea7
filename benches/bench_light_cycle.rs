// benches/bench_light_cycle.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use intersection_monitor::control_system::traffic_light_controller::{
    CycleOutcome, SignalStage, TrafficLightController,
};
use intersection_monitor::shared_data::Direction;
use std::time::Duration;

// One full cycle: tick into yellow, then complete the transition.
fn run_cycle(controller: &mut TrafficLightController, emergency_approaching: bool) {
    if let CycleOutcome::Transition { from, to } = controller.cycle(emergency_approaching) {
        controller.complete_transition(from, to);
    }
}

fn bench_light_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("light_cycle");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    group.bench_function("normal_cycle", |b| {
        let mut controller =
            TrafficLightController::new(SignalStage::EastWestGreen, Direction::North);
        b.iter(|| {
            run_cycle(&mut controller, false);
            black_box(controller.lights());
        });
    });

    group.bench_function("emergency_override", |b| {
        let mut controller =
            TrafficLightController::new(SignalStage::EastWestGreen, Direction::North);
        b.iter(|| {
            run_cycle(&mut controller, true);
            black_box(controller.lights());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_light_cycle);
criterion_main!(benches);
