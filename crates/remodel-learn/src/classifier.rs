//! The estimator and classifier seams shared by all models.

use crate::LearnError;

/// An unfitted model configuration.
///
/// Fitting consumes nothing but a reference to the config and produces a
/// separate fitted type; prediction methods live only on [`Classifier`],
/// so calling them before `fit` does not compile.
pub trait Estimator {
    /// The fitted model this configuration produces.
    type Fitted: Classifier;

    /// Train on a row-major dataset with binary labels (0 negative,
    /// 1 positive).
    ///
    /// # Errors
    ///
    /// Returns a [`LearnError`] describing invalid data (empty, ragged,
    /// non-finite) or an invalid configuration for this data.
    fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<Self::Fitted, LearnError>;
}

/// A fitted model that predicts labels and scores for new samples.
pub trait Classifier {
    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::PredictionFeatureMismatch`] when the sample
    /// width differs from the training width.
    fn predict(&self, sample: &[f64]) -> Result<usize, LearnError>;

    /// Score for the positive class (label 1), in `[0, 1]`. Higher means
    /// more likely positive.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::PredictionFeatureMismatch`] when the sample
    /// width differs from the training width.
    fn positive_score(&self, sample: &[f64]) -> Result<f64, LearnError>;

    /// Predict labels for a batch of samples.
    ///
    /// # Errors
    ///
    /// Fails on the first sample whose width differs from the training
    /// width.
    fn predict_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<usize>, LearnError> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Positive-class scores for a batch of samples.
    ///
    /// # Errors
    ///
    /// Fails on the first sample whose width differs from the training
    /// width.
    fn score_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<f64>, LearnError> {
        samples.iter().map(|s| self.positive_score(s)).collect()
    }
}

/// Validate a row-major training dataset: non-empty, rectangular, finite,
/// with one binary label per row. Returns `(n_samples, n_features)`.
pub(crate) fn validate_dataset(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<(usize, usize), LearnError> {
    if features.is_empty() {
        return Err(LearnError::EmptyDataset);
    }
    let n_samples = features.len();
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(LearnError::ZeroFeatures);
    }
    if labels.len() != n_samples {
        return Err(LearnError::LabelCountMismatch {
            n_samples,
            n_labels: labels.len(),
        });
    }
    for (sample_index, &label) in labels.iter().enumerate() {
        if label > 1 {
            return Err(LearnError::NonBinaryLabel {
                sample_index,
                label,
            });
        }
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(LearnError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(LearnError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok((n_samples, n_features))
}
