use std::collections::BTreeMap;
use std::path::PathBuf;

use clusterbench_cluster::{Algorithm, Family, Fitted, KMeansInit, Params, RunRng};
use clusterbench_dataset::Dataset;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::engine::{ClusterEngine, NativeEngine};
use crate::layout::{DirectoryLayout, OutputLayout};
use crate::normalize::{normalize_centroids, normalize_clustering};
use crate::params;
use crate::persist::{CsvPersistence, Persistence};
use crate::{
    names, seed, AlgorithmRequest, RunContext, RunOutput, ToleranceConfig, ToolkitError, Variant,
};

/// How a failed spectral attempt's successor draws its randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrySeeding {
    /// Keep drawing from the run's generator, so every attempt sees a new draw.
    #[default]
    Continue,
    /// Rebuild the generator from the run seed before every attempt. A seeded
    /// failure then repeats exactly.
    Reseed,
}

/// Retry policy for transient spectral failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralRetry {
    pub seeding: RetrySeeding,
    /// Total attempts before the last error is returned. Unbounded when `None`.
    pub max_attempts: Option<usize>,
}

/// Runs the algorithm catalogue and writes canonical output files.
///
/// One `Toolkit` serves every variant; the [`Variant`] decides the toolkit
/// name and the tolerance applied to k-means and Gaussian mixture fits.
///
/// Every operation seeds a fresh [`RunRng`] from the [`RunContext`], resolves
/// the output paths, fits, then writes the clustering file followed by the
/// centroid file for k-means and mean-shift.
pub struct Toolkit {
    variant: Variant,
    engine: Box<dyn ClusterEngine>,
    layout: Box<dyn OutputLayout>,
    persistence: Box<dyn Persistence>,
    spectral_retry: SpectralRetry,
}

impl Toolkit {
    /// A toolkit writing CSV files under `output_root` with the in-process
    /// engine.
    pub fn new(variant: Variant, output_root: impl Into<PathBuf>) -> Self {
        Self {
            variant,
            engine: Box::new(NativeEngine),
            layout: Box::new(DirectoryLayout::new(output_root)),
            persistence: Box::new(CsvPersistence),
            spectral_retry: SpectralRetry::default(),
        }
    }

    pub fn vanilla(output_root: impl Into<PathBuf>) -> Self {
        Self::new(Variant::Default, output_root)
    }

    /// Tolerance variant. Accepts `f64`, `Option<f64>` or a parsed
    /// [`ToleranceConfig`].
    pub fn with_tolerance(
        tolerance: impl Into<ToleranceConfig>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self::new(Variant::Tolerance(tolerance.into()), output_root)
    }

    /// Tolerance variant from its textual form, e.g. `"0.01"`.
    pub fn with_tolerance_str(
        tolerance: &str,
        output_root: impl Into<PathBuf>,
    ) -> Result<Self, ToolkitError> {
        let tolerance: ToleranceConfig = tolerance.parse()?;
        Ok(Self::with_tolerance(tolerance, output_root))
    }

    pub fn fast(output_root: impl Into<PathBuf>) -> Self {
        Self::new(Variant::Fast, output_root)
    }

    pub fn engine(mut self, engine: Box<dyn ClusterEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn layout(mut self, layout: Box<dyn OutputLayout>) -> Self {
        self.layout = layout;
        self
    }

    pub fn persistence(mut self, persistence: Box<dyn Persistence>) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn spectral_retry(mut self, retry: SpectralRetry) -> Self {
        self.spectral_retry = retry;
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn toolkit_name(&self) -> &'static str {
        self.variant.toolkit_name()
    }

    pub fn run_kmeans_plus_plus(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        n_clusters: usize,
        max_iter: Option<usize>,
    ) -> Result<RunOutput, ToolkitError> {
        self.run_kmeans_with(
            dataset,
            ctx,
            names::KMEANS_PLUS_PLUS,
            n_clusters,
            KMeansInit::KMeansPlusPlus,
            max_iter,
        )
    }

    pub fn run_kmeans_random(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        n_clusters: usize,
        max_iter: Option<usize>,
    ) -> Result<RunOutput, ToolkitError> {
        self.run_kmeans_with(
            dataset,
            ctx,
            names::KMEANS_RANDOM,
            n_clusters,
            KMeansInit::Random,
            max_iter,
        )
    }

    /// k-means from explicit initial centroids, one per cluster.
    pub fn run_kmeans(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        n_clusters: usize,
        initial: Vec<Vec<f64>>,
        max_iter: Option<usize>,
    ) -> Result<RunOutput, ToolkitError> {
        self.run_kmeans_with(
            dataset,
            ctx,
            names::KMEANS,
            n_clusters,
            KMeansInit::Centroids(initial),
            max_iter,
        )
    }

    fn run_kmeans_with(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        identity: &'static str,
        n_clusters: usize,
        init: KMeansInit,
        max_iter: Option<usize>,
    ) -> Result<RunOutput, ToolkitError> {
        let tol = self.variant.tolerance();
        self.execute(dataset, ctx, identity, || {
            Params::KMeans(params::kmeans_params(n_clusters, init, tol, max_iter))
        })
    }

    /// Gaussian mixture. Only the predicted labels are written.
    pub fn run_gaussian(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        n_components: usize,
    ) -> Result<RunOutput, ToolkitError> {
        let tol = self.variant.tolerance();
        self.execute(dataset, ctx, names::GAUSSIAN, || {
            Params::GaussianMixture(params::gaussian_params(n_components, tol))
        })
    }

    pub fn run_hierarchical(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        n_clusters: usize,
    ) -> Result<RunOutput, ToolkitError> {
        self.execute(dataset, ctx, names::HIERARCHICAL, || {
            Params::Hierarchical(params::hierarchical_params(n_clusters))
        })
    }

    pub fn run_meanshift(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
    ) -> Result<RunOutput, ToolkitError> {
        self.execute(dataset, ctx, names::MEANSHIFT, || {
            Params::MeanShift(params::meanshift_params())
        })
    }

    /// Spectral clustering. Transient numerical failures are retried per the
    /// toolkit's [`SpectralRetry`] policy.
    pub fn run_spectral(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        n_clusters: usize,
    ) -> Result<RunOutput, ToolkitError> {
        self.execute(dataset, ctx, names::SPECTRAL, || {
            Params::Spectral(params::spectral_params(n_clusters))
        })
    }

    /// DBSCAN with `eps` and `min_samples` derived from the run number.
    pub fn run_dbscan(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
    ) -> Result<RunOutput, ToolkitError> {
        self.execute(dataset, ctx, names::DBSCAN, || {
            Params::Dbscan(params::dbscan_params(ctx.run_number()))
        })
    }

    /// Affinity propagation with damping derived from the run number.
    pub fn run_ap(&self, dataset: &Dataset, ctx: &RunContext) -> Result<RunOutput, ToolkitError> {
        self.execute(dataset, ctx, names::AP, || {
            Params::AffinityPropagation(params::affinity_params(ctx.run_number()))
        })
    }

    /// Dispatches a request to its operation.
    pub fn run(
        &self,
        request: &AlgorithmRequest,
        dataset: &Dataset,
        ctx: &RunContext,
    ) -> Result<RunOutput, ToolkitError> {
        match request {
            AlgorithmRequest::KMeansPlusPlus { n_clusters, max_iter } => {
                self.run_kmeans_plus_plus(dataset, ctx, *n_clusters, *max_iter)
            }
            AlgorithmRequest::KMeansRandom { n_clusters, max_iter } => {
                self.run_kmeans_random(dataset, ctx, *n_clusters, *max_iter)
            }
            AlgorithmRequest::KMeans {
                n_clusters,
                centroids,
                max_iter,
            } => {
                self.run_kmeans(dataset, ctx, *n_clusters, centroids.clone(), *max_iter)
            }
            AlgorithmRequest::Gaussian { n_components } => {
                self.run_gaussian(dataset, ctx, *n_components)
            }
            AlgorithmRequest::Hierarchical { n_clusters } => {
                self.run_hierarchical(dataset, ctx, *n_clusters)
            }
            AlgorithmRequest::MeanShift => self.run_meanshift(dataset, ctx),
            AlgorithmRequest::Spectral { n_clusters } => {
                self.run_spectral(dataset, ctx, *n_clusters)
            }
            AlgorithmRequest::Dbscan => self.run_dbscan(dataset, ctx),
            AlgorithmRequest::AffinityPropagation => self.run_ap(dataset, ctx),
        }
    }

    fn execute<F>(
        &self,
        dataset: &Dataset,
        ctx: &RunContext,
        identity: &'static str,
        build_params: F,
    ) -> Result<RunOutput, ToolkitError>
    where
        F: FnOnce() -> Params,
    {
        if !self.variant.is_implemented() {
            return Err(ToolkitError::Unsupported {
                toolkit: self.toolkit_name(),
                operation: identity,
            });
        }

        let mut rng = seed::run_rng(ctx.seed());
        let params = build_params();
        let family = params.family();
        let paths = self.layout.paths(
            ctx,
            self.toolkit_name(),
            identity,
            family.produces_centroids(),
        )?;

        tracing::debug!(
            toolkit = self.toolkit_name(),
            algorithm = identity,
            dataset = ctx.dataset_name(),
            run = ctx.run_number(),
            seed = ?ctx.seed(),
            params = ?params,
            "running"
        );

        let records = dataset.records();
        let fitted = if family == Family::Spectral {
            self.fit_with_retry(records.view(), &params, ctx, &mut rng)?
        } else {
            self.engine.fit(records.view(), &params, &mut rng)?
        };

        let clustering = normalize_clustering(dataset, &fitted)?;
        self.persistence.save_clustering(&clustering, &paths.output)?;

        let mut artifacts = BTreeMap::new();
        if let Some(path) = paths.centroids {
            let centroids = normalize_centroids(&fitted)?;
            self.persistence.save_centroids(&centroids, &path)?;
            artifacts.insert(names::CENTROIDS_ARTIFACT.to_string(), path);
        }

        tracing::info!(
            algorithm = identity,
            run = ctx.run_number(),
            clusters = fitted.n_clusters(),
            output = %paths.output.display(),
            "clustering written"
        );
        Ok(RunOutput {
            output: paths.output,
            artifacts,
        })
    }

    fn fit_with_retry(
        &self,
        records: ArrayView2<'_, f64>,
        params: &Params,
        ctx: &RunContext,
        rng: &mut RunRng,
    ) -> Result<Fitted, ToolkitError> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.engine.fit(records, params, rng) {
                Ok(fitted) => {
                    if attempt > 1 {
                        tracing::debug!(attempt, "spectral: succeeded after retry");
                    }
                    return Ok(fitted);
                }
                Err(err) if err.is_transient() => {
                    let exhausted = self
                        .spectral_retry
                        .max_attempts
                        .is_some_and(|max| attempt >= max);
                    if exhausted {
                        tracing::warn!(attempt, error = %err, "spectral: giving up");
                        return Err(err.into());
                    }
                    tracing::warn!(attempt, error = %err, "spectral: attempt failed, retrying");
                    if self.spectral_retry.seeding == RetrySeeding::Reseed {
                        *rng = seed::run_rng(ctx.seed());
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
