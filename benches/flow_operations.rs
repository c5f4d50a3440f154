use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use thermostat_sha::*;

fn bench_flow_evaluate(c: &mut Criterion) {
    let params = ThermostatParams::default();
    let on = params.on_flow().unwrap();
    let off = params.off_flow().unwrap();

    let mut group = c.benchmark_group("flow_evaluate");

    for len in [10, 100, 1000, 10000].iter() {
        let interval: Vec<Timestamp> = (0..*len).map(|i| Timestamp::from_secs(i as f64)).collect();

        group.bench_with_input(BenchmarkId::new("on", len), &interval, |b, interval| {
            b.iter(|| on.evaluate(black_box(interval), black_box(20.0)))
        });
        group.bench_with_input(BenchmarkId::new("off", len), &interval, |b, interval| {
            b.iter(|| off.evaluate(black_box(interval), black_box(20.0)))
        });
    }

    group.finish();
}

fn bench_alphabet_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("alphabet_build");

    for version in [1u32, 2, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(version), version, |b, &v| {
            b.iter(|| EventAlphabet::for_version(black_box(v)).unwrap())
        });
    }

    group.finish();
}

fn bench_mode_map_commit(c: &mut Criterion) {
    c.bench_function("mode_map_commit_100", |b| {
        b.iter(|| {
            let mut map = ModeDistributionMap::with_modes([ON_MODE, OFF_MODE]).unwrap();
            for i in 0..100u32 {
                let a = map.propose(ON_MODE, DistributionId(i % 4)).unwrap();
                map.commit(a).unwrap();
            }
            map
        })
    });
}

criterion_group!(benches, bench_flow_evaluate, bench_alphabet_build, bench_mode_map_commit);
criterion_main!(benches);
