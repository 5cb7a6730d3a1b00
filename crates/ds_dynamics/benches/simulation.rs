use std::hint::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use ds_model::Parameters;
use ds_model::ParameterName;
use ds_model::State;
use ds_dynamics::simulate;
use ds_dynamics::Scenario;
use ds_dynamics::sweep::Sweep;

fn simulate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");

    group.bench_function("experiment_700h_500pts", |b| {
        let p = Parameters::default();
        b.iter(|| simulate(black_box(State::new(1e6, 5000.0)), &p, (0.0, 700.0), 500))
    });

    group.bench_function("fast_growth_50h_10000pts", |b| {
        let p = Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, 1.0).unwrap();
        b.iter(|| simulate(black_box(State::new(50.0, 10.0)), &p, (0.0, 50.0), 10_000))
    });

    group.bench_function("sweep_conc_20", |b| {
        let base = Scenario::new(State::new(1e6, 5000.0), Parameters::default(), (0.0, 700.0), 500)
            .expect("valid scenario");
        let sweep = Sweep::linear(base, ParameterName::C, 0.0, 5.0, 20);
        b.iter(|| sweep.run())
    });
    group.finish();
}

criterion_group!(benches, simulate_benchmark);
criterion_main!(benches);
