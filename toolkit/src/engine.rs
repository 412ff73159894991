use clusterbench_cluster::{Algorithm, ClusterError, Fitted, Params, RunRng};
use ndarray::ArrayView2;

/// The numerical clustering capability behind a toolkit.
pub trait ClusterEngine {
    fn fit(
        &self,
        records: ArrayView2<'_, f64>,
        params: &Params,
        rng: &mut RunRng,
    ) -> Result<Fitted, ClusterError>;
}

/// Runs the algorithms of `clusterbench-cluster` in process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeEngine;

impl ClusterEngine for NativeEngine {
    fn fit(
        &self,
        records: ArrayView2<'_, f64>,
        params: &Params,
        rng: &mut RunRng,
    ) -> Result<Fitted, ClusterError> {
        params.fit(records, rng)
    }
}
