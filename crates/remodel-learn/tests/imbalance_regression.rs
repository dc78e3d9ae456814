//! Regression tests for class-imbalance behavior.
//!
//! These tests pin down the metric properties that motivate reporting
//! ROC-AUC alongside accuracy: a classifier that ignores the minority
//! class can look excellent on accuracy while being worthless at ranking.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use remodel_learn::{
    Classifier, Estimator, KnnConfig, LearnError, MaxFeatures, RandomForestConfig, evaluate,
    roc_auc,
};

/// A classifier that predicts the negative class for everything, with a
/// constant positive score.
struct MajorityOnly;

impl Classifier for MajorityOnly {
    fn predict(&self, _sample: &[f64]) -> Result<usize, LearnError> {
        Ok(0)
    }

    fn positive_score(&self, _sample: &[f64]) -> Result<f64, LearnError> {
        Ok(0.0)
    }
}

/// 95 negatives, 5 positives, one noise feature.
fn imbalanced_data() -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut features = Vec::with_capacity(100);
    let mut labels = Vec::with_capacity(100);
    for i in 0..100 {
        features.push(vec![rng.r#gen::<f64>()]);
        labels.push(usize::from(i >= 95));
    }
    (features, labels)
}

/// A separable imbalanced set: negatives near 0, positives near 10.
fn separable_imbalanced_data() -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut features = Vec::with_capacity(110);
    let mut labels = Vec::with_capacity(110);
    for _ in 0..100 {
        features.push(vec![rng.r#gen::<f64>(), rng.r#gen::<f64>()]);
        labels.push(0);
    }
    for _ in 0..10 {
        features.push(vec![10.0 + rng.r#gen::<f64>(), 10.0 + rng.r#gen::<f64>()]);
        labels.push(1);
    }
    (features, labels)
}

#[test]
fn majority_classifier_high_accuracy_chance_auc() {
    let (features, labels) = imbalanced_data();
    let report = evaluate(&MajorityOnly, &features, &labels).unwrap();

    // 95/100 correct, yet the ranking is pure chance.
    assert!((report.accuracy - 0.95).abs() < 1e-10);
    assert!((report.roc_auc - 0.5).abs() < 1e-10);
    assert_eq!(report.predicted_positive, 0);
    assert!((report.positive_fraction - 0.05).abs() < 1e-10);
}

#[test]
fn constant_scores_always_give_chance_auc() {
    let labels: Vec<usize> = (0..100).map(|i| usize::from(i >= 95)).collect();
    for constant in [0.0, 0.5, 1.0] {
        let scores = vec![constant; 100];
        let auc = roc_auc(&labels, &scores).unwrap();
        assert!((auc - 0.5).abs() < 1e-10, "constant {constant}: auc = {auc}");
    }
}

#[test]
fn forest_separates_what_majority_vote_cannot() {
    let (features, labels) = separable_imbalanced_data();
    let forest = RandomForestConfig::new(50)
        .unwrap()
        .with_max_features(MaxFeatures::All)
        .with_seed(42)
        .fit(&features, &labels)
        .unwrap();

    let report = evaluate(&forest, &features, &labels).unwrap();
    assert!(report.accuracy > 0.95, "accuracy = {}", report.accuracy);
    assert!(report.roc_auc > 0.95, "roc_auc = {}", report.roc_auc);
    assert!(report.predicted_positive > 0);
}

#[test]
fn knn_baseline_on_separable_imbalanced_data() {
    let (features, labels) = separable_imbalanced_data();
    let model = KnnConfig::new(3).unwrap().fit(&features, &labels).unwrap();

    let report = evaluate(&model, &features, &labels).unwrap();
    assert!(report.accuracy > 0.95, "accuracy = {}", report.accuracy);
    assert!(report.roc_auc > 0.95, "roc_auc = {}", report.roc_auc);
}

#[test]
fn forest_evaluation_deterministic_across_runs() {
    let (features, labels) = separable_imbalanced_data();
    let config = RandomForestConfig::new(25).unwrap().with_seed(11);

    let report1 = evaluate(&config.fit(&features, &labels).unwrap(), &features, &labels).unwrap();
    let report2 = evaluate(&config.fit(&features, &labels).unwrap(), &features, &labels).unwrap();

    assert!((report1.accuracy - report2.accuracy).abs() < f64::EPSILON);
    assert!((report1.roc_auc - report2.roc_auc).abs() < f64::EPSILON);
    assert_eq!(report1.confusion, report2.confusion);
}
