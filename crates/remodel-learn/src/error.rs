//! Error types for remodel-learn.

/// Errors from classifier configuration, training, prediction, metrics,
/// and grid search.
#[derive(Debug, thiserror::Error)]
pub enum LearnError {
    /// Returned when the neighbor count is zero.
    #[error("neighbor count must be at least 1, got {k}")]
    InvalidNeighborCount {
        /// The invalid neighbor count.
        k: usize,
    },

    /// Returned when the neighbor count exceeds the training set size.
    #[error("neighbor count {k} exceeds training set size {n_samples}")]
    NeighborCountExceedsSamples {
        /// The requested neighbor count.
        k: usize,
        /// Number of training samples available.
        n_samples: usize,
    },

    /// Returned when the tree count is zero.
    #[error("tree count must be at least 1")]
    InvalidTreeCount,

    /// Returned when the depth limit is zero.
    #[error("maximum depth must be at least 1 when set")]
    InvalidMaxDepth,

    /// Returned when the split threshold is below 2.
    #[error("minimum samples to split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid threshold.
        min_samples_split: usize,
    },

    /// Returned when the leaf threshold is zero.
    #[error("minimum samples per leaf must be at least 1")]
    InvalidMinSamplesLeaf,

    /// Returned when `max_features` resolves outside `[1, n_features]`.
    #[error("max_features resolved to {max_features}, valid range is [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved feature count.
        max_features: usize,
        /// Total number of features in the dataset.
        n_features: usize,
    },

    /// Returned when fewer than 2 folds are requested.
    #[error("fold count must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid fold count.
        n_folds: usize,
    },

    /// Returned when a class has fewer samples than the fold count.
    #[error("class {class} has {count} samples, fewer than {n_folds} folds")]
    TooFewSamplesForFolds {
        /// The class label.
        class: usize,
        /// Number of samples in that class.
        count: usize,
        /// Requested number of folds.
        n_folds: usize,
    },

    /// Returned when training data has zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when training rows have zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a training row has a different width than the first.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Expected number of features.
        expected: usize,
        /// Actual number of features in this row.
        got: usize,
        /// Zero-based row index.
        sample_index: usize,
    },

    /// Returned when the label count does not match the sample count.
    #[error("label count {n_labels} does not match sample count {n_samples}")]
    LabelCountMismatch {
        /// Number of samples.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a training label is neither 0 nor 1.
    #[error("label {label} at sample {sample_index} is not binary (expected 0 or 1)")]
    NonBinaryLabel {
        /// Zero-based row index.
        sample_index: usize,
        /// The offending label.
        label: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite feature value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// Zero-based row index.
        sample_index: usize,
        /// Zero-based column index.
        feature_index: usize,
    },

    /// Returned when a prediction sample has the wrong width.
    #[error("prediction sample has {got} features, model expects {expected}")]
    PredictionFeatureMismatch {
        /// Features the model was trained on.
        expected: usize,
        /// Features in the sample.
        got: usize,
    },

    /// Returned when two metric input vectors differ in length.
    #[error("metric inputs differ in length: {n_labels} labels vs {n_scores} scores")]
    MetricLengthMismatch {
        /// Number of true labels.
        n_labels: usize,
        /// Number of predictions or scores.
        n_scores: usize,
    },

    /// Returned when a metric score is NaN or infinite.
    #[error("non-finite score at index {index}")]
    NonFiniteScore {
        /// Zero-based index of the offending score.
        index: usize,
    },

    /// Returned when ROC-AUC is requested for a single-class label set.
    #[error("ROC-AUC undefined: all labels are {label}")]
    SingleClass {
        /// The only label present.
        label: usize,
    },

    /// Returned when a grid parameter list is empty.
    #[error("grid parameter {parameter} has no candidate values")]
    EmptyGrid {
        /// Name of the empty parameter list.
        parameter: &'static str,
    },
}
