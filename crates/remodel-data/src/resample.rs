//! Class rebalancing for binary label sets.

use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::DataError;
use crate::frame::DesignMatrix;

/// Direction of the rebalancing: grow the minority or shrink the majority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleMode {
    /// Duplicate minority rows (drawn with replacement) until both classes
    /// match the majority count. Every original row is kept.
    Oversample,
    /// Keep a random subset of majority rows so both classes match the
    /// minority count. No row is duplicated.
    Undersample,
}

/// Rebalance a binary dataset to exactly equal class counts.
///
/// Randomness comes from a ChaCha8 generator seeded from `seed`; the same
/// inputs always produce the same resampled matrix. An already balanced
/// matrix comes back unchanged in content (modulo row order for
/// undersampling).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::NotBinary`] | Labels outside `{0, 1}`, or only one distinct label range |
/// | [`DataError::EmptyClass`] | One of the two classes has zero rows |
#[instrument(skip(matrix), fields(n_samples = matrix.n_samples(), ?mode, seed))]
pub fn rebalance(
    matrix: &DesignMatrix,
    mode: ResampleMode,
    seed: u64,
) -> Result<DesignMatrix, DataError> {
    let counts = matrix.label_counts();
    if counts.len() != 2 {
        return Err(DataError::NotBinary {
            n_classes: counts.len(),
        });
    }
    if let Some(label) = counts.iter().position(|&c| c == 0) {
        return Err(DataError::EmptyClass { label });
    }

    let minority_label = usize::from(counts[1] < counts[0]);
    let majority_label = 1 - minority_label;
    let minority: Vec<usize> = rows_of(matrix, minority_label);
    let majority: Vec<usize> = rows_of(matrix, majority_label);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let indices: Vec<usize> = match mode {
        ResampleMode::Oversample => {
            // All original rows stay; the deficit is drawn with replacement
            // from the minority, so each minority row appears at least once.
            let deficit = majority.len() - minority.len();
            let mut indices: Vec<usize> = (0..matrix.n_samples()).collect();
            indices.extend(
                (0..deficit).map(|_| minority[rng.gen_range(0..minority.len())]),
            );
            indices
        }
        ResampleMode::Undersample => {
            let mut pool = majority;
            pool.shuffle(&mut rng);
            pool.truncate(minority.len());
            let mut indices = minority;
            indices.extend(pool);
            indices.sort_unstable();
            indices
        }
    };

    let rebalanced = matrix.select(&indices)?;
    let new_counts = rebalanced.label_counts();
    info!(
        n_negative = new_counts[0],
        n_positive = new_counts[1],
        "classes rebalanced"
    );
    Ok(rebalanced)
}

fn rows_of(matrix: &DesignMatrix, label: usize) -> Vec<usize> {
    matrix
        .labels()
        .iter()
        .enumerate()
        .filter(|&(_, &l)| l == label)
        .map(|(i, _)| i)
        .collect()
}
