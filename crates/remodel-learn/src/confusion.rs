//! Binary confusion counts.

use crate::LearnError;

/// Confusion counts for a binary problem, with label 1 as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryConfusion {
    /// Positives predicted positive.
    pub true_positive: usize,
    /// Negatives predicted positive.
    pub false_positive: usize,
    /// Negatives predicted negative.
    pub true_negative: usize,
    /// Positives predicted negative.
    pub false_negative: usize,
}

impl BinaryConfusion {
    /// Tally counts from aligned true and predicted label slices. Labels
    /// other than 1 count as negative.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::MetricLengthMismatch`] when the slices differ
    /// in length.
    pub fn from_labels(true_labels: &[usize], predicted: &[usize]) -> Result<Self, LearnError> {
        if true_labels.len() != predicted.len() {
            return Err(LearnError::MetricLengthMismatch {
                n_labels: true_labels.len(),
                n_scores: predicted.len(),
            });
        }
        let mut counts = Self {
            true_positive: 0,
            false_positive: 0,
            true_negative: 0,
            false_negative: 0,
        };
        for (&t, &p) in true_labels.iter().zip(predicted) {
            match (t == 1, p == 1) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (true, false) => counts.false_negative += 1,
            }
        }
        Ok(counts)
    }

    /// Total number of samples tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Number of samples predicted positive.
    #[must_use]
    pub fn predicted_positive(&self) -> usize {
        self.true_positive + self.false_positive
    }

    /// Fraction of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positive + self.true_negative) as f64 / total as f64
    }

    /// TP / (TP + FP). Zero when nothing was predicted positive.
    #[must_use]
    pub fn precision(&self) -> f64 {
        let denom = self.true_positive + self.false_positive;
        if denom == 0 {
            return 0.0;
        }
        self.true_positive as f64 / denom as f64
    }

    /// TP / (TP + FN). Zero when there are no positives.
    #[must_use]
    pub fn recall(&self) -> f64 {
        let denom = self.true_positive + self.false_negative;
        if denom == 0 {
            return 0.0;
        }
        self.true_positive as f64 / denom as f64
    }

    /// Harmonic mean of precision and recall. Zero when both are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Counts as `[[tn, fp], [fn, tp]]` — rows are true labels, columns
    /// predicted.
    #[must_use]
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }
}

impl std::fmt::Display for BinaryConfusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tn={} fp={} fn={} tp={}",
            self.true_negative, self.false_positive, self.false_negative, self.true_positive
        )
    }
}
