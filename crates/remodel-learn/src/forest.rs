//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::classifier::{Classifier, Estimator, validate_dataset};
use crate::error::LearnError;
use crate::split::SplitCriterion;
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))` — the usual classification default.
    Sqrt,
    /// `ceil(log2(n_features))`, at least 1.
    Log2,
    /// `ceil(fraction * n_features)`.
    Fraction(f64),
    /// A fixed feature count.
    Fixed(usize),
    /// Every feature, every split.
    All,
}

impl std::fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaxFeatures::Sqrt => write!(f, "sqrt"),
            MaxFeatures::Log2 => write!(f, "log2"),
            MaxFeatures::Fraction(fr) => write!(f, "{fr}"),
            MaxFeatures::Fixed(n) => write!(f, "{n}"),
            MaxFeatures::All => write!(f, "all"),
        }
    }
}

/// Resolve `MaxFeatures` to a concrete count.
pub(crate) fn resolve_max_features(
    max_features: MaxFeatures,
    n_features: usize,
) -> Result<usize, LearnError> {
    let resolved = match max_features {
        MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
        MaxFeatures::Log2 => (n_features as f64).log2().ceil().max(1.0) as usize,
        MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
        MaxFeatures::Fixed(n) => n,
        MaxFeatures::All => n_features,
    };
    if resolved == 0 || resolved > n_features {
        return Err(LearnError::InvalidMaxFeatures {
            max_features: resolved,
            n_features,
        });
    }
    Ok(resolved)
}

/// Configuration for a random forest ensemble.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods
/// and fit through [`Estimator::fit`].
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `max_features`      | `Sqrt`  |
/// | `max_depth`         | `None`  |
/// | `min_samples_split` | 2       |
/// | `min_samples_leaf`  | 1       |
/// | `criterion`         | `Gini`  |
/// | `seed`              | 42      |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    n_trees: usize,
    max_features: MaxFeatures,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    criterion: SplitCriterion,
    seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidTreeCount`] when `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, LearnError> {
        if n_trees == 0 {
            return Err(LearnError::InvalidTreeCount);
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            seed: 42,
        })
    }

    /// Set the per-split feature sampling strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum depth of each tree. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the random seed for bootstrap draws and feature sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the feature sampling strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the minimum samples required in each leaf.
    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Generate a full-size bootstrap sample (drawn with replacement).
fn bootstrap_sample(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

impl Estimator for RandomForestConfig {
    type Fitted = RandomForest;

    /// Train the ensemble: one bootstrap sample and one tree per seed drawn
    /// from a master generator, built in parallel.
    ///
    /// # Errors
    ///
    /// Returns the same data-validation errors as
    /// [`DecisionTreeConfig::fit`](crate::DecisionTreeConfig), plus
    /// [`LearnError::InvalidMaxFeatures`] when the strategy resolves
    /// outside `[1, n_features]`.
    #[instrument(skip_all, fields(n_trees = self.n_trees, n_samples = features.len()))]
    fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, LearnError> {
        let (n_samples, n_features) = validate_dataset(features, labels)?;
        let max_features_resolved = resolve_max_features(self.max_features, n_features)?;

        info!(
            n_trees = self.n_trees,
            n_samples,
            n_features,
            max_features = max_features_resolved,
            "training random forest"
        );

        // Generate per-tree seeds from the master RNG.
        let mut master_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.n_trees).map(|_| master_rng.r#gen()).collect();

        // Capture config fields needed in the closure.
        let criterion = self.criterion;
        let max_depth = self.max_depth;
        let min_samples_split = self.min_samples_split;
        let min_samples_leaf = self.min_samples_leaf;

        let trees: Result<Vec<DecisionTree>, LearnError> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let bootstrap_indices = bootstrap_sample(n_samples, &mut rng);

                let boot_features: Vec<Vec<f64>> = bootstrap_indices
                    .iter()
                    .map(|&i| features[i].clone())
                    .collect();
                let boot_labels: Vec<usize> =
                    bootstrap_indices.iter().map(|&i| labels[i]).collect();

                DecisionTreeConfig::new()
                    .with_criterion(criterion)
                    .with_max_depth(max_depth)
                    .with_min_samples_split(min_samples_split)
                    .with_min_samples_leaf(min_samples_leaf)
                    .with_max_features(Some(max_features_resolved))
                    .with_seed(rng.r#gen())
                    .fit(&boot_features, &boot_labels)
            })
            .collect();
        let trees = trees?;

        debug!(n_trees_trained = trees.len(), "tree training complete");

        Ok(RandomForest { trees, n_features })
    }
}

/// A fitted random forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Mean leaf positive fraction across all trees, in `[0, 1]`.
    fn averaged_positive_score(&self, sample: &[f64]) -> Result<f64, LearnError> {
        if sample.len() != self.n_features {
            return Err(LearnError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut total = 0.0f64;
        for tree in &self.trees {
            total += tree.positive_score(sample)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    /// Predict by thresholding the averaged positive fraction at one half.
    fn predict(&self, sample: &[f64]) -> Result<usize, LearnError> {
        let score = self.averaged_positive_score(sample)?;
        // A score of exactly one half goes to the negative label.
        Ok(usize::from(score > 0.5))
    }

    /// Averaged positive fraction; zero when the training labels never
    /// contained the positive class.
    fn positive_score(&self, sample: &[f64]) -> Result<f64, LearnError> {
        self.averaged_positive_score(sample)
    }

    fn predict_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<usize>, LearnError> {
        samples.par_iter().map(|s| self.predict(s)).collect()
    }

    fn score_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<f64>, LearnError> {
        samples.par_iter().map(|s| self.positive_score(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a simple binary separable dataset.
    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        // Class 0: x in [0, 3]
        for i in 0..20 {
            features.push(vec![i as f64 * 0.15, 0.5]);
            labels.push(0);
        }
        // Class 1: x in [10, 13]
        for i in 0..20 {
            features.push(vec![10.0 + i as f64 * 0.15, 0.5]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn separable_training_accuracy() {
        let (features, labels) = make_separable_data();
        let forest = RandomForestConfig::new(50)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();

        let predictions = forest.predict_batch(&features).unwrap();
        let correct = predictions
            .iter()
            .zip(&labels)
            .filter(|&(&p, &l)| p == l)
            .count();
        let accuracy = correct as f64 / labels.len() as f64;
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = make_separable_data();
        let forest1 = RandomForestConfig::new(10)
            .unwrap()
            .with_seed(99)
            .fit(&features, &labels)
            .unwrap();
        let forest2 = RandomForestConfig::new(10)
            .unwrap()
            .with_seed(99)
            .fit(&features, &labels)
            .unwrap();

        let preds1 = forest1.predict_batch(&features).unwrap();
        let preds2 = forest2.predict_batch(&features).unwrap();
        assert_eq!(preds1, preds2);

        let scores1 = forest1.score_batch(&features).unwrap();
        let scores2 = forest2.score_batch(&features).unwrap();
        assert_eq!(scores1, scores2);
    }

    #[test]
    fn score_batch_matches_individual() {
        let (features, labels) = make_separable_data();
        let forest = RandomForestConfig::new(10)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();

        let batch = forest.score_batch(&features).unwrap();
        for (i, sample) in features.iter().enumerate() {
            let single = forest.positive_score(sample).unwrap();
            assert!((batch[i] - single).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn scores_are_probabilities() {
        let (features, labels) = make_separable_data();
        let forest = RandomForestConfig::new(25)
            .unwrap()
            .with_seed(7)
            .fit(&features, &labels)
            .unwrap();
        for score in forest.score_batch(&features).unwrap() {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn single_class_training_scores_zero() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![0, 0, 0];
        let forest = RandomForestConfig::new(5)
            .unwrap()
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(forest.predict(&[1.5]).unwrap(), 0);
        assert!((forest.positive_score(&[1.5]).unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_tree_count_error() {
        assert!(RandomForestConfig::new(0).is_err());
    }

    #[test]
    fn empty_dataset_error() {
        let config = RandomForestConfig::new(10).unwrap();
        let err = config.fit(&[], &[]).unwrap_err();
        assert!(matches!(err, LearnError::EmptyDataset));
    }

    #[test]
    fn max_features_resolution() {
        assert_eq!(resolve_max_features(MaxFeatures::Sqrt, 16).unwrap(), 4);
        assert_eq!(resolve_max_features(MaxFeatures::Log2, 16).unwrap(), 4);
        assert_eq!(
            resolve_max_features(MaxFeatures::Fraction(0.5), 10).unwrap(),
            5
        );
        assert_eq!(resolve_max_features(MaxFeatures::Fixed(3), 10).unwrap(), 3);
        assert_eq!(resolve_max_features(MaxFeatures::All, 7).unwrap(), 7);
        assert!(resolve_max_features(MaxFeatures::Fixed(11), 10).is_err());
        assert!(resolve_max_features(MaxFeatures::Fixed(0), 10).is_err());
    }

    #[test]
    fn max_features_display() {
        assert_eq!(MaxFeatures::Sqrt.to_string(), "sqrt");
        assert_eq!(MaxFeatures::Log2.to_string(), "log2");
        assert_eq!(MaxFeatures::Fixed(4).to_string(), "4");
        assert_eq!(MaxFeatures::All.to_string(), "all");
    }
}
