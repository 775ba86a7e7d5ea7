// benches/bench_vehicle_motion.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use intersection_monitor::simulation_engine::vehicles::{advance_all, generate_batch};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Duration;

fn bench_vehicle_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("vehicle_motion");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    // A normal batch is 12-20 vehicles; the larger sizes show how a tick scales.
    for &size in [20, 200, 2_000].iter() {
        group.bench_with_input(BenchmarkId::new("advance_all", size), &size, |b, &size| {
            let mut rng = SmallRng::seed_from_u64(7);
            let mut vehicles = generate_batch(&mut rng, size);
            b.iter(|| {
                advance_all(&mut vehicles);
                black_box(&vehicles);
            });
        });
    }

    group.bench_function("generate_batch_16", |b| {
        let mut rng = SmallRng::seed_from_u64(7);
        b.iter(|| black_box(generate_batch(&mut rng, 16)));
    });

    group.finish();
}

criterion_group!(benches, bench_vehicle_motion);
criterion_main!(benches);
