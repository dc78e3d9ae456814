//! The numeric design matrix shared by the splitting, resampling, and
//! training stages.

use crate::DataError;

/// A fully numeric feature matrix with aligned binary labels.
///
/// Feature rows, labels, and column names are stored in parallel —
/// `features[i]` corresponds to `labels[i]`. Invariants enforced at
/// construction: at least one row and one column, rectangular shape,
/// finite values only, one label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl DesignMatrix {
    /// Create a new design matrix, validating shape and finiteness.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::EmptyDataset`] | Zero rows or zero columns |
    /// | [`DataError::LabelLengthMismatch`] | Labels not aligned 1:1 with rows |
    /// | [`DataError::RowWidthMismatch`] | A row differs in width from the names |
    /// | [`DataError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<usize>,
    ) -> Result<Self, DataError> {
        if features.is_empty() || feature_names.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        if labels.len() != features.len() {
            return Err(DataError::LabelLengthMismatch {
                n_records: features.len(),
                n_labels: labels.len(),
            });
        }
        let expected = feature_names.len();
        for (row_index, row) in features.iter().enumerate() {
            if row.len() != expected {
                return Err(DataError::RowWidthMismatch {
                    row_index,
                    expected,
                    got: row.len(),
                });
            }
            for (col_index, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(DataError::NonFiniteValue { row_index, col_index });
                }
            }
        }
        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the label vector.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Count rows per label value. The returned vector has length
    /// `max(label) + 1`.
    #[must_use]
    pub fn label_counts(&self) -> Vec<usize> {
        let n_classes = self.labels.iter().max().copied().unwrap_or(0) + 1;
        let mut counts = vec![0usize; n_classes];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Build a new matrix holding the given rows of this one, in order.
    /// Indices may repeat, which duplicates rows.
    pub(crate) fn select(&self, indices: &[usize]) -> Result<Self, DataError> {
        let features: Vec<Vec<f64>> = indices.iter().map(|&i| self.features[i].clone()).collect();
        let labels: Vec<usize> = indices.iter().map(|&i| self.labels[i]).collect();
        Self::new(self.feature_names.clone(), features, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    #[test]
    fn valid_matrix_accessors() {
        let m = DesignMatrix::new(
            names(2),
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![0, 1, 0],
        )
        .unwrap();
        assert_eq!(m.n_samples(), 3);
        assert_eq!(m.n_features(), 2);
        assert_eq!(m.label_counts(), vec![2, 1]);
    }

    #[test]
    fn empty_rows_error() {
        let err = DesignMatrix::new(names(2), vec![], vec![]).unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset));
    }

    #[test]
    fn label_length_mismatch_error() {
        let err =
            DesignMatrix::new(names(1), vec![vec![1.0], vec![2.0]], vec![0]).unwrap_err();
        assert!(matches!(
            err,
            DataError::LabelLengthMismatch {
                n_records: 2,
                n_labels: 1
            }
        ));
    }

    #[test]
    fn ragged_rows_error() {
        let err = DesignMatrix::new(
            names(2),
            vec![vec![1.0, 2.0], vec![3.0]],
            vec![0, 1],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::RowWidthMismatch { row_index: 1, .. }));
    }

    #[test]
    fn non_finite_value_error() {
        let err = DesignMatrix::new(
            names(2),
            vec![vec![1.0, f64::NAN]],
            vec![0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFiniteValue {
                row_index: 0,
                col_index: 1
            }
        ));
    }

    #[test]
    fn select_duplicates_rows() {
        let m = DesignMatrix::new(
            names(1),
            vec![vec![1.0], vec![2.0]],
            vec![0, 1],
        )
        .unwrap();
        let picked = m.select(&[1, 1, 0]).unwrap();
        assert_eq!(picked.features(), &[vec![2.0], vec![2.0], vec![1.0]]);
        assert_eq!(picked.labels(), &[1, 1, 0]);
    }
}
