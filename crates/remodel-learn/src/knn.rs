//! k-nearest-neighbors baseline classifier.

use tracing::{debug, instrument};

use crate::classifier::{Classifier, Estimator, validate_dataset};
use crate::error::LearnError;

/// Configuration for the k-nearest-neighbors baseline.
///
/// Construct via [`KnnConfig::new`] and fit through [`Estimator::fit`].
/// Distances are Euclidean; ties in the majority vote go to the lower
/// label.
#[derive(Debug, Clone)]
pub struct KnnConfig {
    k: usize,
}

impl KnnConfig {
    /// Create a new config with the given neighbor count.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidNeighborCount`] when `k` is zero.
    pub fn new(k: usize) -> Result<Self, LearnError> {
        if k == 0 {
            return Err(LearnError::InvalidNeighborCount { k });
        }
        Ok(Self { k })
    }

    /// Return the neighbor count.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }
}

impl Estimator for KnnConfig {
    type Fitted = KnnClassifier;

    /// Fitting stores the training set; all the work happens at prediction.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::NeighborCountExceedsSamples`] when `k` is
    /// larger than the training set, plus the usual data-validation errors.
    #[instrument(skip_all, fields(k = self.k, n_samples = features.len()))]
    fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<KnnClassifier, LearnError> {
        let (n_samples, n_features) = validate_dataset(features, labels)?;
        if self.k > n_samples {
            return Err(LearnError::NeighborCountExceedsSamples {
                k: self.k,
                n_samples,
            });
        }
        debug!(n_samples, n_features, "training set stored");
        Ok(KnnClassifier {
            features: features.to_vec(),
            labels: labels.to_vec(),
            k: self.k,
            n_features,
        })
    }
}

/// A fitted k-nearest-neighbors classifier holding its training set.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    k: usize,
    n_features: usize,
}

impl KnnClassifier {
    /// Labels of the `k` nearest training samples, nearest first.
    fn neighbor_labels(&self, sample: &[f64]) -> Result<Vec<usize>, LearnError> {
        if sample.len() != self.n_features {
            return Err(LearnError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut distances: Vec<(f64, usize)> = self
            .features
            .iter()
            .zip(&self.labels)
            .map(|(row, &label)| {
                let d2: f64 = row
                    .iter()
                    .zip(sample)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (d2, label)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(distances.iter().take(self.k).map(|&(_, l)| l).collect())
    }
}

impl Classifier for KnnClassifier {
    /// Majority vote among the `k` nearest neighbors.
    fn predict(&self, sample: &[f64]) -> Result<usize, LearnError> {
        let neighbors = self.neighbor_labels(sample)?;
        let positives = neighbors.iter().filter(|&&l| l == 1).count();
        // An exact tie among the k votes goes to the negative label.
        Ok(usize::from(2 * positives > neighbors.len()))
    }

    /// Fraction of the `k` nearest neighbors carrying the positive label.
    fn positive_score(&self, sample: &[f64]) -> Result<f64, LearnError> {
        let neighbors = self.neighbor_labels(sample)?;
        let positive = neighbors.iter().filter(|&&l| l == 1).count();
        Ok(positive as f64 / self.k as f64)
    }
}
