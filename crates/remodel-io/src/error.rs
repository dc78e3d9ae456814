//! I/O error types for remodel-io.

use std::path::PathBuf;

/// Errors from file I/O, delimited-file parsing, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the delimited-file parser encounters a malformed record.
    #[error("parse error in {path} at byte offset {offset}")]
    Parse {
        /// Path to the input file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the file contains zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the input file.
        path: PathBuf,
    },

    /// Returned when a row has a different number of columns than the schema.
    #[error(
        "row {row_index} in {path} has {got} columns, expected {expected}"
    )]
    ColumnCountMismatch {
        /// Path to the input file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Expected number of columns per the positional schema.
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a numeric cell is neither empty nor a finite float.
    #[error(
        "unparseable number in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\""
    )]
    UnparseableNumber {
        /// Path to the input file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Schema name of the offending column.
        column: String,
        /// The raw cell contents that failed to parse.
        raw: String,
    },

    /// Returned when a row's loan ID cell is empty.
    #[error("empty loan ID in {path} at row {row_index}")]
    EmptyLoanId {
        /// Path to the input file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when the same loan ID appears more than once in the
    /// acquisition file.
    #[error(
        "duplicate loan ID \"{loan_id}\" in {path}: first at row {first_row}, again at row {second_row}"
    )]
    DuplicateLoanId {
        /// Path to the input file.
        path: PathBuf,
        /// The duplicated loan ID.
        loan_id: String,
        /// Zero-based row index of the first occurrence.
        first_row: usize,
        /// Zero-based row index of the second occurrence.
        second_row: usize,
    },

    /// Returned when the modification flag is not `Y`, `N`, or empty.
    #[error(
        "invalid modification flag in {path}: row {row_index}, raw value \"{raw}\" (expected Y, N, or empty)"
    )]
    InvalidModificationFlag {
        /// Path to the input file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// The raw cell contents.
        raw: String,
    },

    /// Returned when the run name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid run name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidRunName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the best-candidate index does not point into the
    /// candidate list of a grid-search result.
    #[error("best candidate index {best_index} out of range for {n_candidates} candidates")]
    BestIndexOutOfRange {
        /// The offending index.
        best_index: usize,
        /// Number of candidates supplied.
        n_candidates: usize,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
