//! k-means on `linfa-clustering`, with k-means++, random or explicit
//! initialization.

use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::{KMeans, KMeansError, KMeansInit as InitMethod};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::model::{fork, Algorithm, Family, Fitted, RunRng};
use crate::validation::{validate_data, validate_n_clusters};
use crate::ClusterError;

/// How initial centroids are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum KMeansInit {
    /// D²-weighted sampling of data points.
    KMeansPlusPlus,
    /// Distinct data points chosen uniformly.
    Random,
    /// Caller-supplied centroids, one per cluster.
    Centroids(Vec<Vec<f64>>),
}

impl KMeansInit {
    pub fn as_str(&self) -> &'static str {
        match self {
            KMeansInit::KMeansPlusPlus => "k-means++",
            KMeansInit::Random => "random",
            KMeansInit::Centroids(_) => "explicit",
        }
    }
}

pub const DEFAULT_TOL: f64 = 1e-4;
pub const DEFAULT_MAX_ITER: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansParams {
    pub n_clusters: usize,
    pub init: KMeansInit,
    /// Independent initializations; the lowest inertia wins.
    /// Ignored for explicit centroids.
    pub n_init: usize,
    /// Relative tolerance on centroid movement, scaled by the mean feature variance.
    pub tol: f64,
    pub max_iter: usize,
}

impl KMeansParams {
    pub fn new(n_clusters: usize, init: KMeansInit) -> Self {
        Self {
            n_clusters,
            init,
            n_init: 1,
            tol: DEFAULT_TOL,
            max_iter: DEFAULT_MAX_ITER,
        }
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    fn check(&self, n_samples: usize, dim: usize) -> Result<(), ClusterError> {
        validate_n_clusters("n_clusters", self.n_clusters, n_samples)?;
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(ClusterError::param("tol", "must be non-negative"));
        }
        if self.max_iter == 0 {
            return Err(ClusterError::param("max_iter", "must be at least 1"));
        }
        if self.n_init == 0 {
            return Err(ClusterError::param("n_init", "must be at least 1"));
        }
        if let KMeansInit::Centroids(centers) = &self.init {
            if centers.len() != self.n_clusters {
                return Err(ClusterError::param(
                    "init",
                    format!("{} centroids given for {} clusters", centers.len(), self.n_clusters),
                ));
            }
            if let Some(bad) = centers.iter().find(|c| c.len() != dim) {
                return Err(ClusterError::param(
                    "init",
                    format!("centroid has {} features, data has {dim}", bad.len()),
                ));
            }
            if centers.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ClusterError::param("init", "centroids must be finite"));
            }
        }
        Ok(())
    }
}

impl Algorithm for KMeansParams {
    fn family(&self) -> Family {
        Family::KMeans
    }

    fn fit(&self, records: ArrayView2<'_, f64>, rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        let dim = validate_data(records, "kmeans")?;
        self.check(records.nrows(), dim)?;

        let (init, n_runs) = match &self.init {
            KMeansInit::KMeansPlusPlus => (InitMethod::KMeansPlusPlus, self.n_init),
            KMeansInit::Random => (InitMethod::Random, self.n_init),
            KMeansInit::Centroids(centers) => {
                let matrix = Array2::from_shape_fn((centers.len(), dim), |(i, j)| centers[i][j]);
                (InitMethod::Precomputed(matrix), 1)
            }
        };

        let run = lloyd(records, self.n_clusters, init, n_runs, self.tol, self.max_iter, rng)
            .map_err(|e| ClusterError::Assertion(format!("kmeans: {e}")))?;
        Ok(Fitted {
            labels: run.labels.iter().map(|&l| l as i32).collect(),
            centroids: Some(run.centroids),
        })
    }
}

/// Memberships and centers of the best k-means run.
#[derive(Debug, Clone)]
pub(crate) struct Lloyd {
    pub labels: Array1<usize>,
    pub centroids: Array2<f64>,
}

/// Runs linfa k-means with a generator forked from `rng`.
///
/// `tol` is relative: iteration stops once the squared centroid shift is at
/// most `tol` times the mean feature variance.
pub(crate) fn lloyd(
    records: ArrayView2<'_, f64>,
    n_clusters: usize,
    init: InitMethod<f64>,
    n_runs: usize,
    tol: f64,
    max_iter: usize,
    rng: &mut RunRng,
) -> Result<Lloyd, KMeansError> {
    // linfa compares the unsquared shift and needs a positive tolerance.
    let tolerance = (tol * mean_variance(records)).sqrt().max(f64::MIN_POSITIVE);
    let model = KMeans::params_with_rng(n_clusters, fork(rng))
        .n_runs(n_runs)
        .tolerance(tolerance)
        .max_n_iterations(max_iter as u64)
        .init_method(init)
        .fit(&DatasetBase::from(records.to_owned()))?;

    let labels: Array1<usize> = model.predict(&records);
    Ok(Lloyd {
        labels,
        centroids: model.centroids().to_owned(),
    })
}

/// Mean of the per-feature population variances.
pub(crate) fn mean_variance(records: ArrayView2<'_, f64>) -> f64 {
    if records.nrows() == 0 {
        return 0.0;
    }
    records.var_axis(Axis(0), 0.0).mean().unwrap_or(0.0)
}
