//! Benchmark of the logistic-regression fit and a cross-validated pipeline
//!
//! Run with: cargo bench --bench logistic_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;

use fatality::pipeline::{
    cross_validate, CategoricalFrame, ClassifierPipeline, Estimator, LogisticRegression,
    OneHotEncoder, RandomUnderSampler, StratifiedKFold, TRAINING_SCORERS,
};

/// Synthetic categorical records: `n_features` columns with `levels`
/// categories each, about 5% positives that favour low category codes.
fn generate_frame(n_rows: usize, n_features: usize, levels: usize, seed: u64) -> (CategoricalFrame, Vec<u8>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let labels: Vec<u8> = (0..n_rows).map(|_| u8::from(rng.gen::<f64>() < 0.05)).collect();

    let columns = (0..n_features)
        .map(|j| {
            let values = labels
                .iter()
                .map(|&y| {
                    let level = if y == 1 && rng.gen::<bool>() {
                        rng.gen_range(0..2)
                    } else {
                        rng.gen_range(0..levels)
                    };
                    Some(format!("{}", level))
                })
                .collect();
            (format!("feature_{}", j), values)
        })
        .collect();

    let frame = CategoricalFrame::from_columns(columns).expect("Failed to create frame");
    (frame, labels)
}

/// Newton fit on one-hot encoded data of growing width
fn benchmark_fit_by_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("logistic_fit_by_width");
    group.sample_size(20);

    let n_rows = 2_000;
    for levels in [5, 10, 25, 50] {
        let (frame, labels) = generate_frame(n_rows, 6, levels, 42);
        let rows: Vec<usize> = (0..n_rows).collect();
        let encoder = OneHotEncoder::fit(&frame, &rows).expect("encoder");
        let x = encoder.transform(&frame, &rows).expect("design matrix");

        group.throughput(Throughput::Elements(encoder.n_outputs() as u64));
        group.bench_with_input(BenchmarkId::new("newton", encoder.n_outputs()), &x, |b, x| {
            b.iter(|| {
                let _ = LogisticRegression::default().fit(black_box(x), black_box(&labels));
            });
        });
    }

    group.finish();
}

/// Five-fold undersampled pipeline, the unit of work of one search candidate
fn benchmark_cross_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("undersampled_cv");
    group.sample_size(10);

    for n_rows in [1_000, 10_000, 50_000] {
        let (frame, labels) = generate_frame(n_rows, 6, 12, 7);
        let folds = StratifiedKFold::new(&labels, 5).expect("folds");
        let pipeline = ClassifierPipeline::undersampled(
            RandomUnderSampler::default(),
            Estimator::Logistic(LogisticRegression::default()),
        );

        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("five_fold", n_rows), &n_rows, |b, _| {
            b.iter(|| {
                let _ = cross_validate(
                    black_box(&pipeline),
                    black_box(&frame),
                    black_box(&labels),
                    black_box(&folds),
                    &TRAINING_SCORERS,
                );
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_fit_by_width, benchmark_cross_validation);
criterion_main!(benches);
