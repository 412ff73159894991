//! Hyperparameter derivation.
//!
//! Every function here is pure: the same run number and overrides always
//! give the same parameters. Overrides are applied only when `Some`, and
//! always win over derived or library defaults.

use clusterbench_cluster::{
    AffinityParams, DbscanParams, GmmParams, HierarchicalParams, KMeansInit, KMeansParams,
    MeanShiftParams, SpectralParams,
};

/// DBSCAN neighbourhood radius grows by this much per run.
pub const DBSCAN_EPS_STEP: f64 = 0.33;
/// `min_samples` cycles through `1..=DBSCAN_MIN_SAMPLES_CYCLE`.
pub const DBSCAN_MIN_SAMPLES_CYCLE: u32 = 10;
pub const AP_DAMPING_BASE: f64 = 0.5;
pub const AP_DAMPING_STEP: f64 = 0.016;

/// `eps = 0.33 * run`, `min_samples = run % 10` with 0 mapped to 10.
pub fn dbscan_params(run_number: u32) -> DbscanParams {
    let eps = DBSCAN_EPS_STEP * f64::from(run_number);
    let min_samples = match run_number % DBSCAN_MIN_SAMPLES_CYCLE {
        0 => DBSCAN_MIN_SAMPLES_CYCLE,
        r => r,
    };
    DbscanParams::new(eps, min_samples as usize)
}

/// `0.016 * run + 0.5`, deliberately unclamped. Runs past 31 leave the
/// algorithm's valid range and fail there.
pub fn affinity_damping(run_number: u32) -> f64 {
    AP_DAMPING_STEP * f64::from(run_number) + AP_DAMPING_BASE
}

pub fn affinity_params(run_number: u32) -> AffinityParams {
    AffinityParams::default().with_damping(affinity_damping(run_number))
}

/// k-means with one initialization. `tol` is the toolkit-level tolerance.
pub fn kmeans_params(
    n_clusters: usize,
    init: KMeansInit,
    tol: Option<f64>,
    max_iter: Option<usize>,
) -> KMeansParams {
    let mut params = KMeansParams::new(n_clusters, init).with_n_init(1);
    if let Some(tol) = tol {
        params = params.with_tol(tol);
    }
    if let Some(max_iter) = max_iter {
        params = params.with_max_iter(max_iter);
    }
    params
}

pub fn gaussian_params(n_components: usize, tol: Option<f64>) -> GmmParams {
    let params = GmmParams::new(n_components);
    match tol {
        Some(tol) => params.with_tol(tol),
        None => params,
    }
}

pub fn hierarchical_params(n_clusters: usize) -> HierarchicalParams {
    HierarchicalParams::new(n_clusters)
}

pub fn meanshift_params() -> MeanShiftParams {
    MeanShiftParams::default()
}

pub fn spectral_params(n_clusters: usize) -> SpectralParams {
    SpectralParams::new(n_clusters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn dbscan_min_samples_wraps_into_one_to_ten() {
        for n in 1..=100u32 {
            let p = dbscan_params(n);
            assert!((1..=10).contains(&p.min_samples), "run {n}");
            assert_eq!(p.min_samples == 10, n % 10 == 0, "run {n}");
            assert_eq!(p.eps, 0.33 * f64::from(n));
        }
    }

    #[test]
    fn dbscan_scenarios() {
        let p = dbscan_params(10);
        assert!(approx(p.eps, 3.3));
        assert_eq!(p.min_samples, 10);

        let p = dbscan_params(5);
        assert!(approx(p.eps, 1.65));
        assert_eq!(p.min_samples, 5);

        assert_eq!(dbscan_params(1).min_samples, 1);
        assert_eq!(dbscan_params(23).min_samples, 3);
    }

    #[test]
    fn affinity_damping_is_linear_and_unclamped() {
        for n in 1..=100u32 {
            assert_eq!(affinity_damping(n), 0.016 * f64::from(n) + 0.5);
        }
        assert!(approx(affinity_damping(1), 0.516));
        assert!(affinity_damping(31) < 1.0);
        assert!(affinity_damping(32) > 1.0);
        assert_eq!(affinity_params(7).damping, affinity_damping(7));
    }

    #[test]
    fn kmeans_overrides_apply_only_when_set() {
        let defaults = KMeansParams::new(3, KMeansInit::Random);
        let p = kmeans_params(3, KMeansInit::Random, None, None);
        assert_eq!(p.tol, defaults.tol);
        assert_eq!(p.max_iter, defaults.max_iter);
        assert_eq!(p.n_init, 1);

        let p = kmeans_params(3, KMeansInit::KMeansPlusPlus, Some(0.01), Some(5));
        assert_eq!(p.tol, 0.01);
        assert_eq!(p.max_iter, 5);
        assert_eq!(p.init, KMeansInit::KMeansPlusPlus);
    }

    #[test]
    fn gaussian_tolerance_override() {
        assert_eq!(gaussian_params(2, None).tol, GmmParams::new(2).tol);
        assert_eq!(gaussian_params(2, Some(0.25)).tol, 0.25);
        assert_eq!(gaussian_params(4, None).n_components, 4);
    }
}
