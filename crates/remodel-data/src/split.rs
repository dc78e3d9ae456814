//! Seeded random train/test splitting.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::DataError;
use crate::frame::DesignMatrix;

/// The two disjoint halves of a train/test split.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Rows assigned to training.
    pub train: DesignMatrix,
    /// Rows assigned to evaluation.
    pub test: DesignMatrix,
}

/// Split a matrix into disjoint train and test sets.
///
/// Row order is shuffled with a ChaCha8 generator seeded from `seed`, so
/// the same inputs always produce the same split. The test set holds
/// `test_fraction` of the rows, rounded to the nearest whole row.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::InvalidTestFraction`] | `test_fraction` outside `(0, 1)` |
/// | [`DataError::DegenerateSplit`] | Either side would be empty |
#[instrument(skip(matrix), fields(n_samples = matrix.n_samples(), test_fraction, seed))]
pub fn train_test_split(
    matrix: &DesignMatrix,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, DataError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataError::InvalidTestFraction {
            fraction: test_fraction,
        });
    }

    let n_samples = matrix.n_samples();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_test = (test_fraction * n_samples as f64).round() as usize;
    if n_test == 0 || n_test == n_samples {
        return Err(DataError::DegenerateSplit { n_samples, n_test });
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = matrix.select(&indices[..n_test])?;
    let train = matrix.select(&indices[n_test..])?;

    info!(
        n_train = train.n_samples(),
        n_test = test.n_samples(),
        "split complete"
    );

    Ok(TrainTestSplit { train, test })
}
