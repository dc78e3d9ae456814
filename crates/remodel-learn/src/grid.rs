//! Exhaustive hyperparameter grid search with stratified k-fold scoring.

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::classifier::{Classifier, Estimator};
use crate::error::LearnError;
use crate::eval::{accuracy, roc_auc};
use crate::folds::stratified_folds;
use crate::forest::{MaxFeatures, RandomForestConfig};

/// Metric used to rank grid candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Fraction of correct predictions.
    Accuracy,
    /// Area under the ROC curve.
    RocAuc,
}

impl std::fmt::Display for Scoring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scoring::Accuracy => write!(f, "accuracy"),
            Scoring::RocAuc => write!(f, "roc_auc"),
        }
    }
}

/// The candidate values for each tunable forest parameter.
///
/// Every combination (the Cartesian product) becomes one candidate, so the
/// search cost is the product of the list lengths times the fold count.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    n_trees: Vec<usize>,
    max_depth: Vec<Option<usize>>,
    min_samples_split: Vec<usize>,
    max_features: Vec<MaxFeatures>,
}

impl ParamGrid {
    /// Create an empty grid. Every parameter list must be populated
    /// before the search runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tree-count candidates.
    #[must_use]
    pub fn with_n_trees(mut self, values: Vec<usize>) -> Self {
        self.n_trees = values;
        self
    }

    /// Set the depth-limit candidates. `None` means unlimited depth.
    #[must_use]
    pub fn with_max_depth(mut self, values: Vec<Option<usize>>) -> Self {
        self.max_depth = values;
        self
    }

    /// Set the split-threshold candidates.
    #[must_use]
    pub fn with_min_samples_split(mut self, values: Vec<usize>) -> Self {
        self.min_samples_split = values;
        self
    }

    /// Set the feature-sampling candidates.
    #[must_use]
    pub fn with_max_features(mut self, values: Vec<MaxFeatures>) -> Self {
        self.max_features = values;
        self
    }

    /// Expand the grid into the full Cartesian product, in deterministic
    /// order (n_trees outermost, max_features innermost).
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::EmptyGrid`] naming the first empty list.
    pub fn candidates(&self) -> Result<Vec<CandidateParams>, LearnError> {
        if self.n_trees.is_empty() {
            return Err(LearnError::EmptyGrid { parameter: "n_trees" });
        }
        if self.max_depth.is_empty() {
            return Err(LearnError::EmptyGrid { parameter: "max_depth" });
        }
        if self.min_samples_split.is_empty() {
            return Err(LearnError::EmptyGrid {
                parameter: "min_samples_split",
            });
        }
        if self.max_features.is_empty() {
            return Err(LearnError::EmptyGrid {
                parameter: "max_features",
            });
        }

        let mut candidates = Vec::with_capacity(
            self.n_trees.len()
                * self.max_depth.len()
                * self.min_samples_split.len()
                * self.max_features.len(),
        );
        for &n_trees in &self.n_trees {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    for &max_features in &self.max_features {
                        candidates.push(CandidateParams {
                            n_trees,
                            max_depth,
                            min_samples_split,
                            max_features,
                        });
                    }
                }
            }
        }
        Ok(candidates)
    }
}

/// One point of the hyperparameter grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateParams {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Depth limit, `None` for unlimited.
    pub max_depth: Option<usize>,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Per-split feature sampling strategy.
    pub max_features: MaxFeatures,
}

impl CandidateParams {
    fn to_config(self, seed: u64) -> Result<RandomForestConfig, LearnError> {
        Ok(RandomForestConfig::new(self.n_trees)?
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_max_features(self.max_features)
            .with_seed(seed))
    }
}

/// Cross-validated scores for one candidate.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    /// The parameters scored.
    pub params: CandidateParams,
    /// Score on each held-out fold.
    pub fold_scores: Vec<f64>,
    /// Mean of the fold scores.
    pub mean_score: f64,
    /// Population standard deviation of the fold scores.
    pub std_score: f64,
}

/// Outcome of a full grid search.
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    /// Every candidate with its cross-validated scores, in grid order.
    pub candidates: Vec<CandidateScore>,
    /// Index into `candidates` of the highest mean score; ties go to the
    /// earlier candidate.
    pub best_index: usize,
}

impl GridSearchResult {
    /// The winning candidate.
    #[must_use]
    pub fn best(&self) -> &CandidateScore {
        &self.candidates[self.best_index]
    }
}

/// Exhaustive search configuration.
///
/// Construct via [`GridSearch::new`], then chain `with_*` methods. Every
/// candidate sees the identical fold assignment, so scores are comparable
/// across the grid.
#[derive(Debug, Clone)]
pub struct GridSearch {
    n_folds: usize,
    scoring: Scoring,
    seed: u64,
}

impl GridSearch {
    /// Create a new search with the given fold count.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidFoldCount`] when `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, LearnError> {
        if n_folds < 2 {
            return Err(LearnError::InvalidFoldCount { n_folds });
        }
        Ok(Self {
            n_folds,
            scoring: Scoring::Accuracy,
            seed: 42,
        })
    }

    /// Set the ranking metric.
    #[must_use]
    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Set the seed for fold assignment and per-fold training.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the fold count.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Return the ranking metric.
    #[must_use]
    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    /// Score every grid candidate with stratified k-fold cross-validation.
    ///
    /// Candidates run in parallel; within a candidate, each fold trains a
    /// forest seeded from the search seed plus the fold number and scores
    /// it on the held-out fold.
    ///
    /// # Errors
    ///
    /// Propagates [`LearnError::EmptyGrid`] from candidate expansion, fold
    /// assignment errors, and any training or metric error from a fold.
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = labels.len()))]
    pub fn run(
        &self,
        grid: &ParamGrid,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<GridSearchResult, LearnError> {
        let candidates = grid.candidates()?;
        let fold_assignments = stratified_folds(labels, self.n_folds, self.seed)?;

        info!(
            n_candidates = candidates.len(),
            scoring = %self.scoring,
            "starting grid search"
        );

        let n_folds = self.n_folds;
        let scoring = self.scoring;
        let seed = self.seed;

        let scored: Result<Vec<CandidateScore>, LearnError> = candidates
            .into_par_iter()
            .map(|params| {
                let mut fold_scores = Vec::with_capacity(n_folds);
                for fold in 0..n_folds {
                    let score = score_fold(
                        params,
                        features,
                        labels,
                        &fold_assignments,
                        fold,
                        scoring,
                        seed.wrapping_add(fold as u64),
                    )?;
                    fold_scores.push(score);
                }

                let mean_score = fold_scores.iter().sum::<f64>() / n_folds as f64;
                let variance = fold_scores
                    .iter()
                    .map(|&s| (s - mean_score).powi(2))
                    .sum::<f64>()
                    / n_folds as f64;

                debug!(?params, mean_score, "candidate scored");

                Ok(CandidateScore {
                    params,
                    fold_scores,
                    mean_score,
                    std_score: variance.sqrt(),
                })
            })
            .collect();
        let scored = scored?;

        // Arg-max over mean scores; ties keep the earlier candidate.
        let best_index = scored
            .iter()
            .enumerate()
            .max_by(|a, b| {
                a.1.mean_score
                    .total_cmp(&b.1.mean_score)
                    .then(b.0.cmp(&a.0))
            })
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        info!(
            best_index,
            best_mean_score = scored[best_index].mean_score,
            "grid search complete"
        );

        Ok(GridSearchResult {
            candidates: scored,
            best_index,
        })
    }
}

/// Train one candidate on all but the held-out fold and score it there.
fn score_fold(
    params: CandidateParams,
    features: &[Vec<f64>],
    labels: &[usize],
    fold_assignments: &[usize],
    fold: usize,
    scoring: Scoring,
    seed: u64,
) -> Result<f64, LearnError> {
    let mut train_features = Vec::new();
    let mut train_labels = Vec::new();
    let mut test_features = Vec::new();
    let mut test_labels = Vec::new();

    for (i, &assigned) in fold_assignments.iter().enumerate() {
        if assigned == fold {
            test_features.push(features[i].clone());
            test_labels.push(labels[i]);
        } else {
            train_features.push(features[i].clone());
            train_labels.push(labels[i]);
        }
    }

    let forest = params.to_config(seed)?.fit(&train_features, &train_labels)?;

    match scoring {
        Scoring::Accuracy => {
            let predicted = forest.predict_batch(&test_features)?;
            accuracy(&test_labels, &predicted)
        }
        Scoring::RocAuc => {
            let scores = forest.score_batch(&test_features)?;
            roc_auc(&test_labels, &scores)
        }
    }
}
