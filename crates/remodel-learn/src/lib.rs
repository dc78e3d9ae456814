//! Classifiers and evaluation for the mortgage modification pipeline:
//! a k-nearest-neighbors baseline, a CART random forest, binary metrics
//! (accuracy, ROC-AUC, confusion counts), stratified k-fold splitting,
//! and exhaustive hyperparameter grid search.
//!
//! Configs are built with `new(..)` plus `with_*` chaining and fitted via
//! [`Estimator::fit`]; only a fitted model implements [`Classifier`], so
//! predicting before fitting is a type error, not a runtime one.

mod classifier;
mod confusion;
mod error;
mod eval;
mod folds;
mod forest;
mod grid;
mod knn;
mod node;
mod split;
mod tree;

pub use classifier::{Classifier, Estimator};
pub use confusion::BinaryConfusion;
pub use error::LearnError;
pub use eval::{Evaluation, accuracy, evaluate, roc_auc};
pub use folds::stratified_folds;
pub use forest::{MaxFeatures, RandomForest, RandomForestConfig};
pub use grid::{
    CandidateParams, CandidateScore, GridSearch, GridSearchResult, ParamGrid, Scoring,
};
pub use knn::{KnnClassifier, KnnConfig};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
