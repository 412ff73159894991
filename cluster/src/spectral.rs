//! Spectral clustering.
//!
//! 1. RBF affinity `exp(-gamma * |x - y|^2)`, self loops ignored
//! 2. Symmetric normalized Laplacian `I - D^-1/2 W D^-1/2`
//! 3. Eigenvectors of the `n_clusters` smallest eigenvalues, scaled by `D^-1/2`
//! 4. k-means on the embedding rows
//!
//! The k-means stage depends on the random draw and may leave a cluster
//! empty; that case is reported as [`ClusterError::Assertion`] so a caller
//! can retry with a fresh draw.

use linfa_clustering::KMeansInit as InitMethod;
use linfa_linalg::eigh::Eigh;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::distance::pairwise_sq_dists;
use crate::kmeans::{lloyd, DEFAULT_MAX_ITER, DEFAULT_TOL};
use crate::model::{Algorithm, Family, Fitted, RunRng};
use crate::validation::{validate_data, validate_n_clusters};
use crate::ClusterError;

pub const DEFAULT_GAMMA: f64 = 1.0;
pub const DEFAULT_N_INIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralParams {
    pub n_clusters: usize,
    /// RBF kernel coefficient.
    pub gamma: f64,
    /// k-means restarts on the embedding.
    pub n_init: usize,
}

impl SpectralParams {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            gamma: DEFAULT_GAMMA,
            n_init: DEFAULT_N_INIT,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }
}

impl Algorithm for SpectralParams {
    fn family(&self) -> Family {
        Family::Spectral
    }

    fn fit(&self, records: ArrayView2<'_, f64>, rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        validate_data(records, "spectral")?;
        let k = self.n_clusters;
        validate_n_clusters("n_clusters", k, records.nrows())?;
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(ClusterError::param("gamma", "must be positive and finite"));
        }
        if self.n_init == 0 {
            return Err(ClusterError::param("n_init", "must be at least 1"));
        }

        let embedding = self.embed(records)?;
        let run = lloyd(
            embedding.view(),
            k,
            InitMethod::KMeansPlusPlus,
            self.n_init,
            DEFAULT_TOL,
            DEFAULT_MAX_ITER,
            rng,
        )
        .map_err(|e| ClusterError::Assertion(format!("spectral: k-means on embedding: {e}")))?;

        let mut used = vec![false; k];
        for &l in &run.labels {
            used[l] = true;
        }
        if let Some(empty) = used.iter().position(|u| !u) {
            return Err(ClusterError::Assertion(format!(
                "spectral: cluster {empty} is empty after label assignment"
            )));
        }

        Ok(Fitted::labels_only(run.labels.iter().map(|&l| l as i32).collect()))
    }
}

impl SpectralParams {
    /// Spectral embedding, one row per data point and one column per cluster.
    fn embed(&self, records: ArrayView2<'_, f64>) -> Result<Array2<f64>, ClusterError> {
        let n = records.nrows();
        let k = self.n_clusters;

        let mut w = pairwise_sq_dists(records).mapv(|d| (-self.gamma * d).exp());
        w.diag_mut().fill(0.0);

        // Isolated vertices get a unit degree.
        let inv_sqrt_deg: Array1<f64> = w
            .sum_axis(Axis(1))
            .mapv(|d| if d > 0.0 { 1.0 / d.sqrt() } else { 1.0 });

        let laplacian = Array2::from_shape_fn((n, n), |(i, j)| {
            let norm = inv_sqrt_deg[i] * w[[i, j]] * inv_sqrt_deg[j];
            if i == j { 1.0 - norm } else { -norm }
        });

        let (values, vectors) = laplacian
            .eigh()
            .map_err(|e| ClusterError::LinAlg(format!("spectral: eigen decomposition: {e}")))?;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        let mut embedding = Array2::zeros((n, k));
        for (c, &idx) in order.iter().take(k).enumerate() {
            let vector = vectors.column(idx);
            // Deterministic sign: largest magnitude entry positive.
            let pivot = vector
                .iter()
                .copied()
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .unwrap_or(0.0);
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            let mut column = embedding.column_mut(c);
            column.assign(&(&vector * &inv_sqrt_deg * sign));
        }

        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(ClusterError::Assertion(
                "spectral: embedding contains non-finite values".into(),
            ));
        }
        Ok(embedding)
    }
}
