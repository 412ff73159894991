//! Gaussian mixture with full covariances, fitted by `linfa-clustering`'s EM.

use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::GaussianMixtureModel;
use ndarray::{Array1, ArrayView2};

use crate::model::{fork, Algorithm, Family, Fitted, RunRng};
use crate::validation::{validate_data, validate_n_clusters};
use crate::ClusterError;

pub const DEFAULT_TOL: f64 = 1e-3;
pub const DEFAULT_MAX_ITER: usize = 100;
pub const DEFAULT_REG_COVAR: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct GmmParams {
    pub n_components: usize,
    /// Convergence threshold on the change of the lower bound.
    pub tol: f64,
    pub max_iter: usize,
    /// Added to every covariance diagonal.
    pub reg_covar: f64,
}

impl GmmParams {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            tol: DEFAULT_TOL,
            max_iter: DEFAULT_MAX_ITER,
            reg_covar: DEFAULT_REG_COVAR,
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
}

impl Algorithm for GmmParams {
    fn family(&self) -> Family {
        Family::GaussianMixture
    }

    /// Predicted labels only. EM failures (a covariance that is not positive
    /// definite, an emptied component, no convergence) are [`ClusterError::LinAlg`].
    fn fit(&self, records: ArrayView2<'_, f64>, rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        validate_data(records, "gaussian")?;
        validate_n_clusters("n_components", self.n_components, records.nrows())?;
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(ClusterError::param("tol", "must be positive"));
        }
        if self.max_iter == 0 {
            return Err(ClusterError::param("max_iter", "must be at least 1"));
        }
        if self.reg_covar.is_nan() || self.reg_covar < 0.0 {
            return Err(ClusterError::param("reg_covar", "must be non-negative"));
        }

        let model = GaussianMixtureModel::params(self.n_components)
            .tolerance(self.tol)
            .max_n_iterations(self.max_iter as u64)
            .reg_covariance(self.reg_covar)
            .with_rng(fork(rng))
            .fit(&DatasetBase::from(records.to_owned()))
            .map_err(|e| {
                tracing::warn!(n_components = self.n_components, error = %e, "gaussian: EM failed");
                ClusterError::LinAlg(format!("gaussian: {e}"))
            })?;

        let labels: Array1<usize> = model.predict(&records);
        Ok(Fitted::labels_only(labels.iter().map(|&l| l as i32).collect()))
    }
}
