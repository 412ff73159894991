//! Flat-kernel mean shift seeded from every data point.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::distance::{nearest, pairwise_sq_dists, sq_dist};
use crate::model::{Algorithm, Family, Fitted, RunRng};
use crate::validation::validate_data;
use crate::ClusterError;

pub const DEFAULT_MAX_ITER: usize = 300;
pub const DEFAULT_QUANTILE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct MeanShiftParams {
    /// Kernel radius. Estimated from the data when `None`.
    pub bandwidth: Option<f64>,
    /// Neighbour quantile used by bandwidth estimation.
    pub quantile: f64,
    pub max_iter: usize,
}

impl Default for MeanShiftParams {
    fn default() -> Self {
        Self {
            bandwidth: None,
            quantile: DEFAULT_QUANTILE,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

impl MeanShiftParams {
    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    /// Explicit bandwidths must be positive. An estimate may be zero when
    /// every neighbourhood is made of duplicates.
    fn bandwidth(&self, records: ArrayView2<'_, f64>) -> Result<f64, ClusterError> {
        match self.bandwidth {
            Some(bw) if bw.is_finite() && bw > 0.0 => Ok(bw),
            Some(bw) => Err(ClusterError::param(
                "bandwidth",
                format!("must be positive and finite, got {bw}"),
            )),
            None => Ok(estimate_bandwidth(records, self.quantile)),
        }
    }
}

/// Mean distance from each point to its `floor(n * quantile)`-th nearest
/// neighbour, the point itself counting as the first.
pub fn estimate_bandwidth(records: ArrayView2<'_, f64>, quantile: f64) -> f64 {
    let n = records.nrows();
    if n == 0 {
        return 0.0;
    }
    let k = ((n as f64 * quantile) as usize).clamp(1, n);
    let d = pairwise_sq_dists(records);
    let total: f64 = d
        .rows()
        .into_iter()
        .map(|row| {
            let mut sorted = row.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            sorted[k - 1].sqrt()
        })
        .sum();
    total / n as f64
}

impl Algorithm for MeanShiftParams {
    fn family(&self) -> Family {
        Family::MeanShift
    }

    fn fit(&self, records: ArrayView2<'_, f64>, _rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        let dim = validate_data(records, "meanshift")?;
        if self.quantile.is_nan() || self.quantile <= 0.0 || self.quantile > 1.0 {
            return Err(ClusterError::param("quantile", "must be in (0, 1]"));
        }
        if self.max_iter == 0 {
            return Err(ClusterError::param("max_iter", "must be at least 1"));
        }

        let bandwidth = self.bandwidth(records)?;
        let stop = 1e-3 * bandwidth;
        // Inclusive, so a zero radius still keeps a seed and its duplicates.
        let radius_sq = bandwidth * bandwidth;

        // (center, intensity) for every seed that kept a non-empty window.
        let mut modes: Vec<(Array1<f64>, usize)> = Vec::with_capacity(records.nrows());
        for seed in records.rows() {
            let mut mean = seed.to_owned();
            let mut iter = 0;
            loop {
                let window: Vec<usize> = (0..records.nrows())
                    .filter(|&i| sq_dist(records.row(i), mean.view()) <= radius_sq)
                    .collect();
                if window.is_empty() {
                    break;
                }
                let previous = std::mem::replace(&mut mean, window_mean(records, &window));
                iter += 1;
                if sq_dist(mean.view(), previous.view()).sqrt() <= stop || iter == self.max_iter {
                    modes.push((mean, window.len()));
                    break;
                }
            }
        }

        if modes.is_empty() {
            return Err(ClusterError::Assertion(format!(
                "meanshift: no seed kept a point within bandwidth {bandwidth}"
            )));
        }

        // Highest intensity first; stable so equal intensities keep seed order.
        modes.sort_by(|a, b| b.1.cmp(&a.1));
        let mut centers: Vec<Array1<f64>> = Vec::new();
        for (mode, _) in modes {
            if centers.iter().all(|c| sq_dist(c.view(), mode.view()) > radius_sq) {
                centers.push(mode);
            }
        }

        let centroids = Array2::from_shape_fn((centers.len(), dim), |(c, j)| centers[c][j]);
        let labels = records
            .rows()
            .into_iter()
            .map(|p: ArrayView1<'_, f64>| nearest(p, centroids.view()) as i32)
            .collect();
        Ok(Fitted {
            labels,
            centroids: Some(centroids),
        })
    }
}

fn window_mean(records: ArrayView2<'_, f64>, window: &[usize]) -> Array1<f64> {
    let selected = records.select(Axis(0), window);
    selected.sum_axis(Axis(0)) / window.len() as f64
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn finds_two_modes_with_centroids() {
        let x = array![
            [1.0, 1.0],
            [1.2, 0.9],
            [0.9, 1.1],
            [6.0, 6.0],
            [6.1, 5.8],
            [5.9, 6.2],
        ];
        let fitted = MeanShiftParams::default()
            .with_bandwidth(1.0)
            .fit(x.view(), &mut RunRng::seed_from_u64(0))
            .unwrap();

        let centers = fitted.centroids.unwrap();
        assert_eq!(centers.nrows(), 2);
        assert_eq!(fitted.labels[0], fitted.labels[1]);
        assert_eq!(fitted.labels[0], fitted.labels[2]);
        assert_eq!(fitted.labels[3], fitted.labels[5]);
        assert_ne!(fitted.labels[0], fitted.labels[3]);

        let first = centers.row(fitted.labels[0] as usize);
        assert!((first[0] - 31.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn estimated_bandwidth() {
        let x = array![[0.0], [1.0], [3.0], [6.0]];
        // n * 0.5 = 2: distance to the nearest other point.
        let bw = estimate_bandwidth(x.view(), 0.5);
        assert!((bw - (1.0 + 1.0 + 2.0 + 3.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_zero_bandwidth_is_rejected() {
        let x = array![[2.0], [3.0], [4.0]];
        let err = MeanShiftParams::default()
            .with_bandwidth(0.0)
            .fit(x.view(), &mut RunRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, ClusterError::InvalidParameter { name: "bandwidth", .. }));
    }

    #[test]
    fn constant_data_is_one_cluster() {
        let x = Array2::from_elem((5, 2), 2.0);
        assert_eq!(estimate_bandwidth(x.view(), DEFAULT_QUANTILE), 0.0);

        let fitted = MeanShiftParams::default()
            .fit(x.view(), &mut RunRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(fitted.labels, vec![0; 5]);
        assert_eq!(fitted.centroids, Some(array![[2.0, 2.0]]));
    }

    #[test]
    fn single_row_is_its_own_center() {
        let x = array![[1.5, -3.0]];
        let fitted = MeanShiftParams::default()
            .fit(x.view(), &mut RunRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(fitted.labels, vec![0]);
        assert_eq!(fitted.centroids, Some(array![[1.5, -3.0]]));
    }
}
