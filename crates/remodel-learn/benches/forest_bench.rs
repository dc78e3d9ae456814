//! Criterion benchmarks for remodel-learn: forest training and batch
//! prediction on a synthetic imbalanced dataset.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use remodel_learn::{Classifier, Estimator, KnnConfig, RandomForestConfig};

fn make_classification(n_samples: usize, n_features: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        // One positive in ten, shifted on the first three features.
        let class = usize::from(i % 10 == 0);
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn bench_forest_train(c: &mut Criterion) {
    let (features, labels) = make_classification(500, 20, 42);
    let cfg = RandomForestConfig::new(50).unwrap().with_seed(42);

    c.bench_function("forest_train_500x20_50trees", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_forest_predict_batch(c: &mut Criterion) {
    let (features, labels) = make_classification(500, 20, 42);
    let forest = RandomForestConfig::new(50)
        .unwrap()
        .with_seed(42)
        .fit(&features, &labels)
        .unwrap();

    c.bench_function("forest_predict_batch_500x20_50trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

fn bench_knn_predict_batch(c: &mut Criterion) {
    let (features, labels) = make_classification(500, 20, 42);
    let model = KnnConfig::new(3).unwrap().fit(&features, &labels).unwrap();

    c.bench_function("knn_predict_batch_500x20_k3", |b| {
        b.iter(|| model.predict_batch(&features).unwrap());
    });
}

criterion_group!(
    benches,
    bench_forest_train,
    bench_forest_predict_batch,
    bench_knn_predict_batch
);
criterion_main!(benches);
