//! Run these benches with `cargo bench --bench trajectory -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};
use metfor::{HectoPascal, Kelvin};
use sounding_network::cells::trajectory::{lift, DryAdiabat, Pseudoadiabat};

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(trajectory_benches);

criterion_group!(
    name = trajectory_benches;
    config = build_tester();
    targets = dry_lift_bench, wet_lift_bench
);

fn dry_lift_bench(c: &mut Criterion) {
    c.bench_function("dry_lift", |b| {
        b.iter(|| {
            let _x = lift(
                &DryAdiabat,
                HectoPascal(1000.0),
                Kelvin(303.15),
                HectoPascal(850.0),
            )
            .expect("oops");
        });
    });
}

fn wet_lift_bench(c: &mut Criterion) {
    c.bench_function("wet_lift", |b| {
        b.iter(|| {
            let _x = lift(
                &Pseudoadiabat,
                HectoPascal(900.0),
                Kelvin(293.15),
                HectoPascal(100.0),
            )
            .expect("oops");
        });
    });
}
