//! Benchmarks for the transpilation pipeline
//!
//! Run with: cargo bench -p synq-compile

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use synq_compile::passes::{Router, RoutingStrategy};
use synq_compile::pipeline::{transpile, PipelineOptions};
use synq_compile::property::{Layout, PropertySet};
use synq_compile::{CancellationToken, Pass};
use synq_device::{BasisGates, CouplingMap, DeviceTopology};
use synq_ir::{Circuit, QubitId};

fn ghz_circuit(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("ghz", n, 0);
    circuit.h(QubitId(0)).unwrap();
    for i in 0..n - 1 {
        circuit.cx(QubitId(i), QubitId(i + 1)).unwrap();
    }
    circuit
}

/// Benchmark the Router on circuits whose two-qubit gates need increasing
/// amounts of SWAP insertion, on a fixed linear device.
fn bench_router(c: &mut Criterion) {
    let mut group = c.benchmark_group("router");

    for &n in &[5, 10, 20, 50] {
        let device = DeviceTopology::new(n, CouplingMap::linear(n), BasisGates::universal());

        // All-to-all two-qubit gates, worst case for a linear device's router.
        let mut circuit = Circuit::with_size("dense", n, 0);
        for i in 0..n {
            for j in (i + 2..n).step_by(2) {
                circuit.cx(QubitId(i), QubitId(j)).unwrap();
            }
        }

        group.bench_with_input(BenchmarkId::new("naive", n), &circuit, |b, circuit| {
            b.iter(|| {
                let mut dag = circuit.clone().into_dag();
                let mut props = PropertySet::new()
                    .with_target(device.coupling_map.clone(), device.basis_gates.clone());
                props.layout = Some(Layout::trivial(n));
                Router::new(RoutingStrategy::Naive)
                    .run(&mut dag, &mut props)
                    .unwrap();
                black_box(dag)
            });
        });

        group.bench_with_input(BenchmarkId::new("lookahead", n), &circuit, |b, circuit| {
            b.iter(|| {
                let mut dag = circuit.clone().into_dag();
                let mut props = PropertySet::new()
                    .with_target(device.coupling_map.clone(), device.basis_gates.clone());
                props.layout = Some(Layout::trivial(n));
                Router::new(RoutingStrategy::Lookahead)
                    .run(&mut dag, &mut props)
                    .unwrap();
                black_box(dag)
            });
        });
    }

    group.finish();
}

/// Benchmark the full `transpile` pipeline (normalize + layout + route +
/// estimate) end to end on GHZ-state circuits of increasing width.
fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpile_pipeline");

    for &n in &[5, 10, 20, 50] {
        let device = DeviceTopology::new(n, CouplingMap::linear(n), BasisGates::universal());
        let circuit = ghz_circuit(n);

        group.bench_with_input(BenchmarkId::new("ghz", n), &circuit, |b, circuit| {
            b.iter(|| {
                transpile(
                    black_box(circuit),
                    black_box(&device),
                    PipelineOptions::new(),
                    &CancellationToken::new(),
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_router, bench_full_pipeline);
criterion_main!(benches);
