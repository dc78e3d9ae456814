//! Data preparation for the mortgage modification pipeline: label
//! derivation, one-hot feature encoding with an explicit missing-value
//! policy, seeded train/test splitting, and class rebalancing.

mod encode;
mod error;
mod frame;
mod label;
mod prepare;
mod resample;
mod split;

pub use encode::OneHotEncoding;
pub use error::DataError;
pub use frame::DesignMatrix;
pub use label::derive_labels;
pub use prepare::{CategoricalField, FeatureSpec, NumericField, prepare};
pub use resample::{ResampleMode, rebalance};
pub use split::{TrainTestSplit, train_test_split};
