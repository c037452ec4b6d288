//! Run these benches with `cargo bench --bench network -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};
use metfor::{Celsius, HectoPascal};
use sounding_network::{AerologicalNetwork, ParcelMode};
use strum::IntoEnumIterator;

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(network_benches);

criterion_group!(
    name = network_benches;
    config = build_tester();
    targets = build_network_bench, new_sounding_bench, parcel_mode_bench
);

fn loaded_network() -> AerologicalNetwork {
    let mut anal = AerologicalNetwork::new().expect("oops");
    anal.set_minimum_pressure(HectoPascal(100.0)).expect("oops");
    anal.set_reference_pressure(HectoPascal(900.0)).expect("oops");
    anal.set_reference_temperature(Celsius(25.0)).expect("oops");
    anal
}

fn build_network_bench(c: &mut Criterion) {
    c.bench_function("build_network", |b| {
        b.iter(|| {
            let _x = AerologicalNetwork::new().expect("oops");
        });
    });
}

fn new_sounding_bench(c: &mut Criterion) {
    let snds = utils::load_all_soundings();
    let mut anal = loaded_network();

    c.bench_function("new_sounding", |b| {
        b.iter(|| {
            for (p, t, dp) in &snds {
                let _x = anal.set_sounding(p, t, dp).expect("oops");
            }
        });
    });
}

fn parcel_mode_bench(c: &mut Criterion) {
    let snds = utils::load_all_soundings();
    let mut anal = loaded_network();

    c.bench_function("parcel_mode", |b| {
        b.iter(|| {
            for (p, t, dp) in &snds {
                anal.set_sounding(p, t, dp).expect("oops");
                for mode in ParcelMode::iter() {
                    let _x = anal.set_parcel_mode(mode).expect("oops");
                }
            }
        });
    });
}
