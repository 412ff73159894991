//! Clustering algorithms used by the clusterbench toolkit.
//!
//! Every algorithm is a parameter struct implementing [`Algorithm`]. It takes
//! the dataset as an `ndarray` matrix view (one row per observation) and an
//! explicit [`RunRng`], and returns a [`Fitted`] model. The [`Params`] enum selects a family at runtime.
//!
//! # Usage
//!
//! ```
//! use clusterbench_cluster::{Algorithm, DbscanParams, RunRng};
//! use ndarray::array;
//! use rand::SeedableRng;
//!
//! let x = array![[0.0, 0.0], [0.1, 0.0], [9.0, 9.0]];
//!
//! let mut rng = RunRng::seed_from_u64(42);
//! let fitted = DbscanParams::new(0.5, 2).fit(x.view(), &mut rng).unwrap();
//! assert_eq!(fitted.labels, vec![0, 0, -1]);
//! ```
//!
//! # Failure classes
//!
//! [`ClusterError::LinAlg`] and [`ClusterError::Assertion`] depend on the
//! random draw ([`ClusterError::is_transient`]). Every other error is
//! deterministic for a given input and parameter set.

mod affinity;
mod dbscan;
mod distance;
mod error;
mod gmm;
mod hierarchical;
mod kmeans;
mod mean_shift;
mod model;
mod spectral;
mod validation;

pub use affinity::AffinityParams;
pub use dbscan::DbscanParams;
pub use error::ClusterError;
pub use gmm::GmmParams;
pub use hierarchical::{HierarchicalParams, Linkage};
pub use kmeans::{KMeansInit, KMeansParams};
pub use mean_shift::{estimate_bandwidth, MeanShiftParams};
pub use model::{Algorithm, Family, Fitted, Params, RunRng, NOISE};
pub use spectral::SpectralParams;
