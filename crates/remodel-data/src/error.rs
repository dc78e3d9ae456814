//! Error types for remodel-data.

/// Errors from feature preparation, splitting, and resampling.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when an operation receives zero records or rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when the label vector does not match the record count.
    #[error("label count {n_labels} does not match record count {n_records}")]
    LabelLengthMismatch {
        /// Number of input records.
        n_records: usize,
        /// Number of labels provided.
        n_labels: usize,
    },

    /// Returned when the feature specification selects no fields.
    #[error("feature specification selects no fields")]
    EmptyFeatureSpec,

    /// Returned when the missing-value policy drops every input row.
    #[error("all {n_records} rows were dropped by the missing-value policy")]
    NoRowsRetained {
        /// Number of input records before filtering.
        n_records: usize,
    },

    /// Returned when a matrix row has a different width than the first row.
    #[error("row {row_index} has {got} columns, expected {expected}")]
    RowWidthMismatch {
        /// Zero-based row index.
        row_index: usize,
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns.
        got: usize,
    },

    /// Returned when a matrix value is NaN or infinite.
    #[error("non-finite value at row {row_index}, column {col_index}")]
    NonFiniteValue {
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
    },

    /// Returned when the test fraction is outside (0, 1).
    #[error("test fraction must be in (0, 1), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when the requested split would leave a side empty.
    #[error("split of {n_samples} samples with {n_test} test rows leaves a side empty")]
    DegenerateSplit {
        /// Total number of samples.
        n_samples: usize,
        /// Number of test rows the fraction resolved to.
        n_test: usize,
    },

    /// Returned when resampling is asked for a non-binary label set.
    #[error("resampling requires exactly 2 classes, got {n_classes}")]
    NotBinary {
        /// Number of distinct classes observed.
        n_classes: usize,
    },

    /// Returned when a class has zero rows, making resampling undefined.
    #[error("class {label} has zero rows; cannot rebalance")]
    EmptyClass {
        /// The class label with no rows.
        label: usize,
    },
}
