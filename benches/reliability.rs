//! Benchmarks for matrix building and the coefficient engine.
//!
//! Compares sequential and rayon-parallel pair evaluation as the number of
//! coders grows.

use accord::{
    CoefficientEngine, LevelOfMeasurement, MatrixBuilder, ReliabilityConfig, ReliabilityEngine,
};
use accord_core::CoderAnnotation;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const LABELS: [&str; 6] = ["Anger", "Joy", "Fear", "Place", "Person", "Time"];

/// Deterministic synthetic coders over a `text_len` text.
fn synthetic_coders(n_coders: usize, text_len: usize) -> Vec<CoderAnnotation> {
    (0..n_coders)
        .map(|c| {
            let id = format!("coder{c}");
            let mut annotation = CoderAnnotation::new(id.clone(), format!("{id}.json"));
            let mut start = c % 7;
            let mut i = 0usize;
            while start + 3 < text_len {
                let len = 3 + (i * 7 + c) % 20;
                let end = (start + len).min(text_len);
                let label = LABELS[(i + c / 2) % LABELS.len()];
                annotation = match annotation.clone().with_span(label, start, end) {
                    Ok(next) => next,
                    Err(_) => annotation,
                };
                start = end + 5 + (i * 3 + c) % 11;
                i += 1;
            }
            annotation
        })
        .collect()
}

fn bench_matrix_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_build");
    for &text_len in &[1_000usize, 10_000, 50_000] {
        let coders = synthetic_coders(5, text_len);
        group.bench_with_input(BenchmarkId::from_parameter(text_len), &coders, |b, coders| {
            b.iter(|| MatrixBuilder::build(black_box(coders), text_len))
        });
    }
    group.finish();
}

fn bench_cohens_kappa(c: &mut Criterion) {
    let mut group = c.benchmark_group("cohens_kappa");
    group.sample_size(20);
    for &n_coders in &[2usize, 5, 10] {
        let built = MatrixBuilder::build(&synthetic_coders(n_coders, 20_000), 20_000);
        for parallel in [false, true] {
            let engine = CoefficientEngine::new().with_parallel(parallel);
            let name = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(
                BenchmarkId::new(name, n_coders),
                &built.matrices,
                |b, matrices| b.iter(|| engine.cohens_kappa(black_box(matrices))),
            );
        }
    }
    group.finish();
}

fn bench_krippendorff(c: &mut Criterion) {
    let built = MatrixBuilder::build(&synthetic_coders(5, 20_000), 20_000);
    let engine = CoefficientEngine::new();
    let mut group = c.benchmark_group("krippendorffs_alpha");
    for level in [LevelOfMeasurement::Nominal, LevelOfMeasurement::Ordinal] {
        group.bench_function(level.as_str(), |b| {
            b.iter(|| engine.krippendorffs_alpha(black_box(&built.matrices), level))
        });
    }
    group.finish();
}

fn bench_full_report(c: &mut Criterion) {
    let coders = synthetic_coders(6, 10_000);
    let engine = ReliabilityEngine::new(ReliabilityConfig::default().with_gold_index(0));
    c.bench_function("full_report", |b| {
        b.iter(|| engine.compute(black_box(&coders), 10_000))
    });
}

criterion_group!(
    benches,
    bench_matrix_build,
    bench_cohens_kappa,
    bench_krippendorff,
    bench_full_report
);
criterion_main!(benches);
