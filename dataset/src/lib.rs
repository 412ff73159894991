//! Ordered, indexed numeric datasets.
//!
//! A [`Dataset`] is an immutable list of [`Row`]s. Each row carries a stable
//! index and its feature vector, with the target column already removed.
//! Clustering code reads the features through [`Dataset::features`], and the
//! index is only used to key the persisted output.

mod csv;
mod dataset;
mod error;

pub use csv::CsvOptions;
pub use dataset::{Dataset, Row};
pub use error::DatasetError;
