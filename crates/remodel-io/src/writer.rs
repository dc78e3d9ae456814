//! JSON result writer for evaluation and grid-search outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::RunName;

/// Writes evaluation and grid-search results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{run}_evaluate.json` and `{run}_search.json`.
///
/// Accepts primitives and plain entry structs — the writer has no
/// dependency on the learning crate.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

/// One grid-search candidate, flattened for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    /// Number of trees in the candidate forest.
    pub n_trees: usize,
    /// Maximum tree depth, if limited.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Max-features strategy, rendered as a string (e.g. `sqrt`).
    pub max_features: String,
    /// Per-fold cross-validation scores.
    pub fold_scores: Vec<f64>,
    /// Mean cross-validation score.
    pub mean_score: f64,
    /// Standard deviation of the fold scores.
    pub std_score: f64,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Write an evaluation result to `{run}_evaluate.json`.
    ///
    /// `confusion` is the binary confusion matrix as
    /// `[[tn, fp], [fn, tp]]` (rows are true labels).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        classifier: &str,
        resample: &str,
        n_train: usize,
        n_test: usize,
        accuracy: f64,
        roc_auc: f64,
        predicted_positive: usize,
        predicted_positive_fraction: f64,
        positive_fraction: f64,
        confusion: [[usize; 2]; 2],
    ) -> Result<(), IoError> {
        let path = self
            .output_dir
            .join(format!("{}_evaluate.json", self.run.as_str()));

        let artifact = EvaluateArtifact {
            run: self.run.as_str(),
            classifier,
            resample,
            n_train,
            n_test,
            accuracy,
            roc_auc,
            predicted_positive,
            predicted_positive_fraction,
            positive_fraction,
            confusion,
        };

        let json = serde_json::to_string_pretty(&artifact).expect("serialization cannot fail");
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "evaluation result written");
        Ok(())
    }

    /// Write a grid-search result to `{run}_search.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::BestIndexOutOfRange`] if `best_index` does not
    /// point into `candidates`, and [`IoError::WriteFile`] if the file
    /// cannot be written.
    #[instrument(skip_all)]
    pub fn write_search(
        &self,
        scoring: &str,
        n_folds: usize,
        best_index: usize,
        candidates: &[SearchEntry],
    ) -> Result<(), IoError> {
        let best = candidates
            .get(best_index)
            .ok_or(IoError::BestIndexOutOfRange {
                best_index,
                n_candidates: candidates.len(),
            })?;

        let path = self
            .output_dir
            .join(format!("{}_search.json", self.run.as_str()));

        let artifact = SearchArtifact {
            run: self.run.as_str(),
            scoring,
            n_folds,
            n_candidates: candidates.len(),
            best_index,
            best,
            candidates,
        };

        let json = serde_json::to_string_pretty(&artifact).expect("serialization cannot fail");
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "search result written");
        Ok(())
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    run: &'a str,
    classifier: &'a str,
    resample: &'a str,
    n_train: usize,
    n_test: usize,
    accuracy: f64,
    roc_auc: f64,
    predicted_positive: usize,
    predicted_positive_fraction: f64,
    positive_fraction: f64,
    confusion: [[usize; 2]; 2],
}

#[derive(Serialize)]
struct SearchArtifact<'a> {
    run: &'a str,
    scoring: &'a str,
    n_folds: usize,
    n_candidates: usize,
    best_index: usize,
    best: &'a SearchEntry,
    candidates: &'a [SearchEntry],
}
