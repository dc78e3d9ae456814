//! Split search for binary CART trees.
//!
//! The label space is fixed at two classes, so class counts are a pair of
//! counters rather than per-class vectors, and both impurity formulas
//! reduce to closed forms in the positive fraction.

use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: `2p(1 - p)` for positive fraction `p`.
    Gini,
    /// Information entropy: `-(p·ln(p) + (1 - p)·ln(1 - p))`.
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node from its two-class tally.
    ///
    /// Returns zero for an empty or pure node.
    #[must_use]
    pub(crate) fn impurity(&self, tally: ClassTally) -> Impurity {
        if tally.is_pure() {
            return Impurity::new(0.0);
        }
        let p = tally.positive_fraction();
        let q = 1.0 - p;
        let value = match self {
            SplitCriterion::Gini => 2.0 * p * q,
            SplitCriterion::Entropy => -(p * p.ln() + q * q.ln()),
        };
        Impurity::new(value)
    }
}

/// Running negative/positive counts for a node or for one side of a
/// candidate boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ClassTally {
    negatives: usize,
    positives: usize,
}

impl ClassTally {
    /// Tally the labels of the given sample indices.
    pub(crate) fn from_labels(labels: &[usize], sample_indices: &[usize]) -> Self {
        let positives = sample_indices.iter().filter(|&&si| labels[si] == 1).count();
        Self {
            negatives: sample_indices.len() - positives,
            positives,
        }
    }

    pub(crate) fn record(&mut self, label: usize) {
        if label == 1 {
            self.positives += 1;
        } else {
            self.negatives += 1;
        }
    }

    pub(crate) fn forget(&mut self, label: usize) {
        if label == 1 {
            self.positives -= 1;
        } else {
            self.negatives -= 1;
        }
    }

    pub(crate) fn total(self) -> usize {
        self.negatives + self.positives
    }

    pub(crate) fn positive_fraction(self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.positives as f64 / self.total() as f64
        }
    }

    /// Majority label; an exact tie goes to the negative class.
    pub(crate) fn majority(self) -> usize {
        usize::from(self.positives > self.negatives)
    }

    pub(crate) fn is_pure(self) -> bool {
        self.negatives == 0 || self.positives == 0
    }
}

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Feature used for the split.
    pub(crate) feature: FeatureIndex,
    /// Threshold value.
    pub(crate) threshold: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Best boundary along one feature column, as `(threshold, weighted
/// impurity decrease)`.
///
/// Walks the samples in sorted column order; the left tally grows and the
/// right tally shrinks one label at a time, so each boundary costs two
/// counter updates and two closed-form impurity evaluations.
fn scan_column(
    column: &[f64],
    labels: &[usize],
    sample_indices: &[usize],
    parent: ClassTally,
    parent_impurity: Impurity,
    criterion: &SplitCriterion,
    min_samples_leaf: usize,
) -> Option<(f64, f64)> {
    let n_samples = sample_indices.len();
    let mut order = sample_indices.to_vec();
    order.sort_unstable_by(|&a, &b| column[a].total_cmp(&column[b]));

    let mut left = ClassTally::default();
    let mut right = parent;
    let mut best: Option<(f64, f64)> = None;

    for boundary in 0..(n_samples - 1) {
        let label = labels[order[boundary]];
        left.record(label);
        right.forget(label);

        // Equal adjacent values admit no boundary between them.
        let value = column[order[boundary]];
        let next = column[order[boundary + 1]];
        if value == next {
            continue;
        }
        if left.total() < min_samples_leaf || right.total() < min_samples_leaf {
            continue;
        }

        let decrease = (n_samples as f64) * parent_impurity.value()
            - (left.total() as f64) * criterion.impurity(left).value()
            - (right.total() as f64) * criterion.impurity(right).value();

        if best.is_none_or(|(_, d)| decrease > d) {
            best = Some(((value + next) / 2.0, decrease));
        }
    }

    best
}

/// Find the best split among a random subset of features.
///
/// Scans each of `max_features` randomly chosen columns with
/// [`scan_column`] and keeps the boundary with the largest weighted
/// impurity decrease; ties go to the earlier column in the shuffled order.
///
/// Returns `None` when no valid split exists (all values identical, or
/// every boundary would violate `min_samples_leaf`).
///
/// # Column-major layout
///
/// `features` is column-major: `features[feature_idx][sample_idx]`.
/// `sample_indices` are indices into these inner Vecs.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    criterion: &SplitCriterion,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = features.len();
    if sample_indices.is_empty() || n_features == 0 {
        return None;
    }

    let parent = ClassTally::from_labels(labels, sample_indices);
    let parent_impurity = criterion.impurity(parent);

    // Partial Fisher-Yates: shuffle only the first `max_features` positions.
    let mut feature_order: Vec<usize> = (0..n_features).collect();
    let take = max_features.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
    }

    let mut best: Option<(FeatureIndex, f64, f64)> = None;
    for &feat_idx in &feature_order[..take] {
        if let Some((threshold, decrease)) = scan_column(
            &features[feat_idx],
            labels,
            sample_indices,
            parent,
            parent_impurity,
            criterion,
            min_samples_leaf,
        ) && best.is_none_or(|(_, _, d)| decrease > d)
        {
            best = Some((FeatureIndex::new(feat_idx), threshold, decrease));
        }
    }

    let (feature, threshold, _) = best?;

    // Partition sample_indices into left/right.
    let column = &features[feature.index()];
    let mut left_indices = Vec::with_capacity(sample_indices.len() / 2);
    let mut right_indices = Vec::with_capacity(sample_indices.len() / 2);
    for &si in sample_indices {
        if column[si] <= threshold {
            left_indices.push(si);
        } else {
            right_indices.push(si);
        }
    }

    Some(SplitResult {
        feature,
        threshold,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{ClassTally, SplitCriterion, find_best_split};

    fn tally(labels: &[usize]) -> ClassTally {
        let indices: Vec<usize> = (0..labels.len()).collect();
        ClassTally::from_labels(labels, &indices)
    }

    #[test]
    fn gini_pure() {
        let imp = SplitCriterion::Gini.impurity(tally(&[0; 10]));
        assert!((imp.value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_balanced() {
        let imp = SplitCriterion::Gini.impurity(tally(&[0, 0, 0, 0, 0, 1, 1, 1, 1, 1]));
        assert!((imp.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_pure() {
        let imp = SplitCriterion::Entropy.impurity(tally(&[1; 10]));
        assert!((imp.value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_balanced() {
        let imp = SplitCriterion::Entropy.impurity(tally(&[0, 0, 0, 0, 0, 1, 1, 1, 1, 1]));
        assert!((imp.value() - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn tally_tracks_record_and_forget() {
        let mut t = ClassTally::default();
        t.record(0);
        t.record(1);
        t.record(1);
        assert_eq!(t.total(), 3);
        assert!((t.positive_fraction() - 2.0 / 3.0).abs() < 1e-12);
        t.forget(1);
        assert_eq!(t.total(), 2);
        assert!((t.positive_fraction() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn majority_tie_goes_to_negative() {
        assert_eq!(tally(&[0, 1]).majority(), 0);
        assert_eq!(tally(&[0, 1, 1]).majority(), 1);
        assert_eq!(tally(&[0, 0, 1]).majority(), 0);
    }

    #[test]
    fn separable_data_finds_correct_split() {
        // Feature 0: [1.0, 2.0, 3.0, 10.0, 11.0, 12.0]
        // Labels:    [0,   0,   0,    1,    1,    1  ]
        let features = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let sample_indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = find_best_split(
            &features,
            &labels,
            &sample_indices,
            &SplitCriterion::Gini,
            1,
            1,
            &mut rng,
        );

        let split = result.expect("should find a split");
        assert_eq!(split.feature.index(), 0);
        assert!(split.threshold > 3.0 && split.threshold < 10.0);
        assert_eq!(split.left_indices.len(), 3);
        assert_eq!(split.right_indices.len(), 3);
    }

    #[test]
    fn constant_feature_returns_none() {
        // All values are 5.0 — no valid split
        let features = vec![vec![5.0, 5.0, 5.0, 5.0]];
        let labels = vec![0, 0, 1, 1];
        let sample_indices: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = find_best_split(
            &features,
            &labels,
            &sample_indices,
            &SplitCriterion::Gini,
            1,
            1,
            &mut rng,
        );

        assert!(result.is_none());
    }

    #[test]
    fn min_samples_leaf_enforced() {
        // 2 samples, min_samples_leaf = 2 — each child would have only 1.
        let features = vec![vec![1.0, 10.0]];
        let labels = vec![0, 1];
        let sample_indices: Vec<usize> = (0..2).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = find_best_split(
            &features,
            &labels,
            &sample_indices,
            &SplitCriterion::Gini,
            1,
            2,
            &mut rng,
        );

        assert!(result.is_none());
    }
}
