//! Held-out evaluation: accuracy, ROC-AUC, and the combined report.

use tracing::{info, instrument};

use crate::classifier::Classifier;
use crate::confusion::BinaryConfusion;
use crate::error::LearnError;

/// Fraction of predictions matching the true labels.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`LearnError::EmptyDataset`] | Zero labels |
/// | [`LearnError::MetricLengthMismatch`] | Slices differ in length |
pub fn accuracy(true_labels: &[usize], predicted: &[usize]) -> Result<f64, LearnError> {
    if true_labels.is_empty() {
        return Err(LearnError::EmptyDataset);
    }
    if true_labels.len() != predicted.len() {
        return Err(LearnError::MetricLengthMismatch {
            n_labels: true_labels.len(),
            n_scores: predicted.len(),
        });
    }
    let correct = true_labels
        .iter()
        .zip(predicted)
        .filter(|&(t, p)| t == p)
        .count();
    Ok(correct as f64 / true_labels.len() as f64)
}

/// Area under the ROC curve via the rank-sum identity.
///
/// Scores are ranked ascending with ties sharing their average rank, so a
/// constant scorer comes out at exactly 0.5 — indistinguishable from
/// chance, however high its accuracy on an imbalanced set.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`LearnError::EmptyDataset`] | Zero labels |
/// | [`LearnError::MetricLengthMismatch`] | Slices differ in length |
/// | [`LearnError::NonFiniteScore`] | A score is NaN or infinite |
/// | [`LearnError::SingleClass`] | Only one label value present |
pub fn roc_auc(true_labels: &[usize], scores: &[f64]) -> Result<f64, LearnError> {
    if true_labels.is_empty() {
        return Err(LearnError::EmptyDataset);
    }
    if true_labels.len() != scores.len() {
        return Err(LearnError::MetricLengthMismatch {
            n_labels: true_labels.len(),
            n_scores: scores.len(),
        });
    }
    for (index, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            return Err(LearnError::NonFiniteScore { index });
        }
    }
    let n_positive = true_labels.iter().filter(|&&l| l == 1).count();
    let n_negative = true_labels.len() - n_positive;
    if n_positive == 0 || n_negative == 0 {
        return Err(LearnError::SingleClass {
            label: true_labels[0],
        });
    }

    // Sort indices by score; tied scores share their average rank.
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0f64; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // Ranks are 1-based; positions i..=j all get the average.
        let average_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = average_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = true_labels
        .iter()
        .zip(&ranks)
        .filter(|&(&l, _)| l == 1)
        .map(|(_, &r)| r)
        .sum();

    let auc = (positive_rank_sum - (n_positive * (n_positive + 1)) as f64 / 2.0)
        / (n_positive as f64 * n_negative as f64);
    Ok(auc)
}

/// The full held-out evaluation report for one fitted classifier.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// Area under the ROC curve.
    pub roc_auc: f64,
    /// Binary confusion counts.
    pub confusion: BinaryConfusion,
    /// Number of evaluated samples.
    pub n_test: usize,
    /// Number of samples predicted positive.
    pub predicted_positive: usize,
    /// Fraction of samples predicted positive.
    pub predicted_positive_fraction: f64,
    /// Fraction of samples actually positive.
    pub positive_fraction: f64,
}

/// Evaluate a fitted classifier on held-out data.
///
/// # Errors
///
/// Propagates prediction errors from the model, plus the metric errors of
/// [`accuracy`] and [`roc_auc`] — notably [`LearnError::SingleClass`] when
/// the held-out labels contain only one class.
#[instrument(skip_all, fields(n_test = labels.len()))]
pub fn evaluate<C: Classifier>(
    model: &C,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<Evaluation, LearnError> {
    if features.len() != labels.len() {
        return Err(LearnError::MetricLengthMismatch {
            n_labels: labels.len(),
            n_scores: features.len(),
        });
    }
    let predicted = model.predict_batch(features)?;
    let scores = model.score_batch(features)?;

    let accuracy = accuracy(labels, &predicted)?;
    let roc_auc = roc_auc(labels, &scores)?;
    let confusion = BinaryConfusion::from_labels(labels, &predicted)?;

    let n_test = labels.len();
    let predicted_positive = confusion.predicted_positive();
    let n_positive = labels.iter().filter(|&&l| l == 1).count();

    info!(accuracy, roc_auc, n_test, "evaluation complete");

    Ok(Evaluation {
        accuracy,
        roc_auc,
        confusion,
        n_test,
        predicted_positive,
        predicted_positive_fraction: predicted_positive as f64 / n_test as f64,
        positive_fraction: n_positive as f64 / n_test as f64,
    })
}
