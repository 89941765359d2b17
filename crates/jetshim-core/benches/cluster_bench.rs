// ─────────────────────────────────────────────────────────────────────
// Jetshim — Conversion and Clustering Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the bridge hot path: buffer conversion and
//! generalized-kt clustering of a synthetic event.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jetshim_core::{cluster, configure_diagnostics, convert_records, Clusterer};
use jetshim_types::{ClusterConfig, Encoding};

/// Deterministic `(pt, eta, phi, mass)` event of `n` particles.
fn synthetic_event(n: usize) -> Vec<f64> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..n)
        .flat_map(|_| {
            let pt = 0.5 + 50.0 * next().powi(4);
            let eta = 8.0 * next() - 4.0;
            let phi = std::f64::consts::TAU * next();
            [pt, eta, phi, 0.0]
        })
        .collect()
}

// ── convert_records() ───────────────────────────────────────────────

fn bench_convert_1000(c: &mut Criterion) {
    let buffer = synthetic_event(1000);
    c.bench_function("convert_1000_ptepm", |b| {
        b.iter(|| convert_records(black_box(&buffer), 1000, 4, 2.5, Encoding::PtEtaPhiMass))
    });
}

// ── cluster() ───────────────────────────────────────────────────────

fn bench_antikt_200(c: &mut Criterion) {
    configure_diagnostics();
    let buffer = synthetic_event(200);
    let particles = convert_records(&buffer, 200, 4, 0.0, Encoding::PtEtaPhiMass).unwrap();
    c.bench_function("antikt_r04_200", |b| {
        b.iter(|| cluster(black_box(particles.clone()), 0.4, -1))
    });
}

fn bench_kt_200(c: &mut Criterion) {
    configure_diagnostics();
    let buffer = synthetic_event(200);
    let particles = convert_records(&buffer, 200, 4, 0.0, Encoding::PtEtaPhiMass).unwrap();
    c.bench_function("kt_r06_200", |b| {
        b.iter(|| cluster(black_box(particles.clone()), 0.6, 1))
    });
}

// ── Clusterer.run() ─────────────────────────────────────────────────

fn bench_pipeline_500(c: &mut Criterion) {
    configure_diagnostics();
    let buffer = synthetic_event(500);
    let clusterer = Clusterer::new(ClusterConfig {
        radius: 0.4,
        power: -1,
        eta_max: 2.5,
        ..Default::default()
    })
    .unwrap();
    c.bench_function("pipeline_antikt_500", |b| {
        b.iter(|| clusterer.run(black_box(&buffer), 500))
    });
}

criterion_group!(
    benches,
    bench_convert_1000,
    bench_antikt_200,
    bench_kt_200,
    bench_pipeline_500,
);
criterion_main!(benches);
