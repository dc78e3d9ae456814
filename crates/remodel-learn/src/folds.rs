//! Stratified fold assignment for cross-validation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::LearnError;

/// Assign each sample to one of `n_folds` folds, stratified by label.
///
/// Indices are grouped by class, shuffled within each class with a ChaCha8
/// generator seeded from `seed`, then dealt round-robin across folds, so
/// every fold carries approximately the full class distribution.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`LearnError::EmptyDataset`] | Zero labels |
/// | [`LearnError::InvalidFoldCount`] | `n_folds` < 2 |
/// | [`LearnError::TooFewSamplesForFolds`] | A present class has fewer samples than folds |
pub fn stratified_folds(
    labels: &[usize],
    n_folds: usize,
    seed: u64,
) -> Result<Vec<usize>, LearnError> {
    if labels.is_empty() {
        return Err(LearnError::EmptyDataset);
    }
    if n_folds < 2 {
        return Err(LearnError::InvalidFoldCount { n_folds });
    }

    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let mut class_indices: Vec<Vec<usize>> = vec![vec![]; n_classes];
    for (i, &label) in labels.iter().enumerate() {
        class_indices[label].push(i);
    }

    for (class, indices) in class_indices.iter().enumerate() {
        if !indices.is_empty() && indices.len() < n_folds {
            return Err(LearnError::TooFewSamplesForFolds {
                class,
                count: indices.len(),
                n_folds,
            });
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut assignments = vec![0usize; labels.len()];
    for indices in &mut class_indices {
        indices.shuffle(&mut rng);
        for (j, &idx) in indices.iter().enumerate() {
            assignments[idx] = j % n_folds;
        }
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fold_gets_both_classes() {
        let labels: Vec<usize> = (0..50).map(|i| usize::from(i % 5 == 0)).collect();
        let assignments = stratified_folds(&labels, 5, 42).unwrap();
        for fold in 0..5 {
            let fold_labels: Vec<usize> = assignments
                .iter()
                .zip(&labels)
                .filter(|&(&a, _)| a == fold)
                .map(|(_, &l)| l)
                .collect();
            assert!(fold_labels.contains(&0), "fold {fold} missing class 0");
            assert!(fold_labels.contains(&1), "fold {fold} missing class 1");
        }
    }

    #[test]
    fn fold_sizes_are_balanced() {
        let labels: Vec<usize> = (0..40).map(|i| i % 2).collect();
        let assignments = stratified_folds(&labels, 4, 0).unwrap();
        for fold in 0..4 {
            let size = assignments.iter().filter(|&&a| a == fold).count();
            assert_eq!(size, 10);
        }
    }

    #[test]
    fn same_seed_same_assignment() {
        let labels: Vec<usize> = (0..30).map(|i| i % 2).collect();
        let a = stratified_folds(&labels, 3, 9).unwrap();
        let b = stratified_folds(&labels, 3, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_fold_count() {
        let labels = vec![0, 1, 0, 1];
        assert!(matches!(
            stratified_folds(&labels, 1, 0).unwrap_err(),
            LearnError::InvalidFoldCount { n_folds: 1 }
        ));
    }

    #[test]
    fn too_few_samples_in_a_class() {
        // Class 1 has 2 samples but 5 folds are requested.
        let labels = vec![0, 0, 0, 0, 0, 1, 1];
        let err = stratified_folds(&labels, 5, 0).unwrap_err();
        assert!(matches!(
            err,
            LearnError::TooFewSamplesForFolds {
                class: 1,
                count: 2,
                n_folds: 5
            }
        ));
    }
}
