use std::collections::VecDeque;

use ndarray::ArrayView2;

use crate::distance::sq_dist;
use crate::model::{Algorithm, Family, Fitted, NOISE, RunRng};
use crate::validation::validate_data;
use crate::ClusterError;

/// DBSCAN over Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DbscanParams {
    /// Maximum distance for two points to be neighbours.
    pub eps: f64,
    /// Minimum neighbourhood size (the point itself included) of a core point.
    pub min_samples: usize,
}

impl DbscanParams {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }
}

impl Algorithm for DbscanParams {
    fn family(&self) -> Family {
        Family::Dbscan
    }

    /// Labels are 0-based in discovery order; [`NOISE`] marks unassigned points.
    fn fit(&self, records: ArrayView2<'_, f64>, _rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        validate_data(records, "dbscan")?;
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(ClusterError::param("eps", format!("must be positive, got {}", self.eps)));
        }
        if self.min_samples == 0 {
            return Err(ClusterError::param("min_samples", "must be at least 1"));
        }

        Ok(Fitted::labels_only(dbscan(records, self.eps, self.min_samples)))
    }
}

fn dbscan(points: ArrayView2<'_, f64>, eps: f64, min_pts: usize) -> Vec<i32> {
    const UNDEFINED: i32 = -2;

    let n = points.nrows();
    let eps_sq = eps * eps;
    let mut labels = vec![UNDEFINED; n];
    let mut cluster_id: i32 = -1;

    for i in 0..n {
        if labels[i] != UNDEFINED {
            continue;
        }

        let neighbors = range_query(points, i, eps_sq);
        if neighbors.len() < min_pts {
            labels[i] = NOISE;
            continue;
        }

        // Start a new cluster.
        cluster_id += 1;
        labels[i] = cluster_id;

        // Seed set: neighbors minus point i.
        let mut seed: VecDeque<usize> = neighbors.into_iter().filter(|&j| j != i).collect();

        while let Some(q) = seed.pop_front() {
            if labels[q] == NOISE {
                // Border point.
                labels[q] = cluster_id;
            }
            if labels[q] != UNDEFINED {
                continue;
            }
            labels[q] = cluster_id;

            let q_neighbors = range_query(points, q, eps_sq);
            if q_neighbors.len() >= min_pts {
                seed.extend(q_neighbors);
            }
        }
    }

    labels
}

/// Indices of all points within eps of row idx, idx included.
fn range_query(points: ArrayView2<'_, f64>, idx: usize, eps_sq: f64) -> Vec<usize> {
    let q = points.row(idx);
    points
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(_, p)| sq_dist(q, *p) <= eps_sq)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use rand::SeedableRng;

    use super::*;

    fn fit(x: Array2<f64>, eps: f64, min_samples: usize) -> Vec<i32> {
        DbscanParams::new(eps, min_samples)
            .fit(x.view(), &mut RunRng::seed_from_u64(0))
            .unwrap()
            .labels
    }

    #[test]
    fn basic_two_clusters() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [5.0, 5.0],
            [5.1, 5.0],
            [5.0, 5.1],
        ];
        assert_eq!(fit(x, 0.3, 2), vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn noise_and_border_points() {
        // 1 and 2 are core points, 0 and 3 are borders, 10 is isolated.
        let x = array![[0.0], [1.0], [2.0], [3.0], [10.0]];
        assert_eq!(fit(x, 1.0, 3), vec![0, 0, 0, 0, -1]);
    }

    #[test]
    fn min_samples_counts_the_point_itself() {
        assert_eq!(fit(array![[0.0], [100.0]], 0.5, 1), vec![0, 1]);
        assert_eq!(fit(array![[0.0], [100.0]], 0.5, 2), vec![-1, -1]);
    }

    #[test]
    fn single_point_is_noise() {
        assert_eq!(fit(array![[1.0, 0.0, 0.0]], 0.1, 2), vec![-1]);
    }

    #[test]
    fn rejects_bad_parameters() {
        let x = array![[1.0]];
        let mut rng = RunRng::seed_from_u64(0);
        assert!(DbscanParams::new(0.0, 1).fit(x.view(), &mut rng).is_err());
        assert!(DbscanParams::new(1.0, 0).fit(x.view(), &mut rng).is_err());
        let empty = Array2::<f64>::zeros((0, 1));
        assert!(DbscanParams::new(1.0, 1).fit(empty.view(), &mut rng).is_err());
    }
}
