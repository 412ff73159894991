//! Clustering benchmark toolkit.
//!
//! A [`Toolkit`] turns an algorithm request into a seeded fit and a set of
//! canonical output files:
//!
//! - hyperparameters come from the run number ([`params`]),
//! - randomness comes from one [`RunRng`](clusterbench_cluster::RunRng) per run ([`seed`]),
//! - labels and centroids are normalized ([`normalize`]) and written ([`persist`]).
//!
//! # Usage
//!
//! ```no_run
//! use clusterbench_dataset::{CsvOptions, Dataset};
//! use clusterbench_toolkit::{RunContext, Toolkit};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Dataset::from_csv_path("iris.csv", &CsvOptions::default().with_target("class"))?;
//! let toolkit = Toolkit::with_tolerance_str("0.01", "out")?;
//!
//! let ctx = RunContext::new(5, dataset.name())?.with_seed(42);
//! let run = toolkit.run_kmeans_plus_plus(&dataset, &ctx, 3, None)?;
//! println!("{} {:?}", run.output.display(), run.artifacts.get("centroids"));
//!
//! // eps = 1.65, min_samples = 5
//! toolkit.run_dbscan(&dataset, &ctx)?;
//! # Ok(())
//! # }
//! ```
//!
//! The external collaborators sit behind [`ClusterEngine`], [`OutputLayout`]
//! and [`Persistence`] so each can be replaced independently.

mod context;
mod engine;
mod error;
mod layout;
pub mod names;
pub mod normalize;
pub mod params;
pub mod persist;
mod request;
pub mod seed;
mod toolkit;
mod variant;

pub use context::{RunContext, RunOutput};
pub use engine::{ClusterEngine, NativeEngine};
pub use error::ToolkitError;
pub use layout::{DirectoryLayout, OutputLayout, OutputPaths};
pub use normalize::{normalize_centroids, normalize_clustering, CentroidSource, LabelSource};
pub use persist::{load_centroids, load_clustering, CsvPersistence, Persistence};
pub use request::AlgorithmRequest;
pub use toolkit::{RetrySeeding, SpectralRetry, Toolkit};
pub use variant::{ToleranceConfig, Variant};
