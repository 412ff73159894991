//! Affinity propagation by responsibility/availability message passing.

use ndarray::{Array2, ArrayView2, Axis, Zip};
use rand::Rng;

use crate::distance::pairwise_sq_dists;
use crate::model::{Algorithm, Family, Fitted, NOISE, RunRng};
use crate::validation::validate_data;
use crate::ClusterError;

pub const DEFAULT_DAMPING: f64 = 0.5;
pub const DEFAULT_MAX_ITER: usize = 200;
pub const DEFAULT_CONVERGENCE_ITER: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct AffinityParams {
    /// Weight of the previous message in each update. Valid range is [0.5, 1).
    pub damping: f64,
    pub max_iter: usize,
    /// Iterations without exemplar change that count as converged.
    pub convergence_iter: usize,
    /// Self-similarity. The median similarity when `None`.
    pub preference: Option<f64>,
}

impl Default for AffinityParams {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            max_iter: DEFAULT_MAX_ITER,
            convergence_iter: DEFAULT_CONVERGENCE_ITER,
            preference: None,
        }
    }
}

impl AffinityParams {
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    fn check(&self) -> Result<(), ClusterError> {
        if !(0.5..1.0).contains(&self.damping) {
            return Err(ClusterError::param(
                "damping",
                format!("must be in [0.5, 1.0), got {}", self.damping),
            ));
        }
        if self.max_iter == 0 {
            return Err(ClusterError::param("max_iter", "must be at least 1"));
        }
        if self.convergence_iter == 0 {
            return Err(ClusterError::param("convergence_iter", "must be at least 1"));
        }
        Ok(())
    }
}

impl Algorithm for AffinityParams {
    fn family(&self) -> Family {
        Family::AffinityPropagation
    }

    fn fit(&self, records: ArrayView2<'_, f64>, rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        validate_data(records, "ap")?;
        self.check()?;

        let n = records.nrows();
        if n == 1 {
            return Ok(Fitted::labels_only(vec![0]));
        }

        let mut s = pairwise_sq_dists(records).mapv(|d| -d);
        let preference = match self.preference {
            Some(p) => p,
            None => median(s.iter().copied().collect()),
        };
        s.diag_mut().fill(preference);
        // Tiny noise breaks ties between equally good exemplars.
        s.mapv_inplace(|v| {
            let scale = f64::EPSILON * v.abs() + f64::MIN_POSITIVE * 100.0;
            v + scale * rng.gen_range(-0.5..0.5)
        });

        let damping = self.damping;
        let mut r = Array2::<f64>::zeros((n, n));
        let mut a = Array2::<f64>::zeros((n, n));
        let window = self.convergence_iter;
        let mut history: Vec<Vec<bool>> = vec![vec![false; n]; window];
        let mut n_iter = 0;
        let mut converged = false;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;

            // Responsibilities: s(i,k) minus the best competing a(i,k') + s(i,k').
            let scores = &a + &s;
            for ((scores, s_row), mut r_row) in scores
                .rows()
                .into_iter()
                .zip(s.rows())
                .zip(r.rows_mut())
            {
                let mut first = (0usize, f64::NEG_INFINITY);
                let mut second = f64::NEG_INFINITY;
                for (k, &v) in scores.iter().enumerate() {
                    if v > first.1 {
                        second = first.1;
                        first = (k, v);
                    } else if v > second {
                        second = v;
                    }
                }
                for (k, r_ik) in r_row.iter_mut().enumerate() {
                    let competitor = if k == first.0 { second } else { first.1 };
                    *r_ik = damping * *r_ik + (1.0 - damping) * (s_row[k] - competitor);
                }
            }

            // Availabilities from the column sums of positive responsibilities,
            // with r(k,k) kept as is.
            let mut rp = r.mapv(|v| v.max(0.0));
            rp.diag_mut().assign(&r.diag());
            let column_sums = rp.sum_axis(Axis(0));
            Zip::indexed(&mut a).and(&rp).for_each(|(i, k), a_ik, &rp_ik| {
                let update = column_sums[k] - rp_ik;
                let update = if i == k { update } else { update.min(0.0) };
                *a_ik = damping * *a_ik + (1.0 - damping) * update;
            });

            let exemplars: Vec<bool> = (0..n).map(|k| a[[k, k]] + r[[k, k]] > 0.0).collect();
            let any = exemplars.iter().any(|&e| e);
            history[iter % window] = exemplars;
            if iter >= window {
                let stable = (0..n).all(|k| {
                    let count = history.iter().filter(|h| h[k]).count();
                    count == 0 || count == window
                });
                if stable && any {
                    converged = true;
                    break;
                }
            }
        }

        let exemplars: Vec<usize> = (0..n).filter(|&k| a[[k, k]] + r[[k, k]] > 0.0).collect();
        if !converged || exemplars.is_empty() {
            tracing::warn!(
                n_iter,
                damping,
                "ap: did not converge; every sample is labelled noise"
            );
            return Ok(Fitted::labels_only(vec![NOISE; n]));
        }

        tracing::debug!(n_iter, n_exemplars = exemplars.len(), "ap: converged");
        Ok(Fitted::labels_only(assign(&s, exemplars)))
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Assigns points to exemplars, re-centres each cluster on its most similar
/// member and numbers clusters by ascending exemplar index.
fn assign(s: &Array2<f64>, mut exemplars: Vec<usize>) -> Vec<i32> {
    let n = s.nrows();
    let nearest_exemplar = |exemplars: &[usize]| -> Vec<usize> {
        (0..n)
            .map(|i| {
                if let Some(pos) = exemplars.iter().position(|&e| e == i) {
                    return pos;
                }
                let mut best = (0usize, f64::NEG_INFINITY);
                for (pos, &e) in exemplars.iter().enumerate() {
                    if s[[i, e]] > best.1 {
                        best = (pos, s[[i, e]]);
                    }
                }
                best.0
            })
            .collect()
    };

    let cluster = nearest_exemplar(&exemplars);
    for (pos, exemplar) in exemplars.iter_mut().enumerate() {
        let members: Vec<usize> = (0..n).filter(|&i| cluster[i] == pos).collect();
        let mut best = (*exemplar, f64::NEG_INFINITY);
        for &j in &members {
            let score: f64 = members.iter().map(|&i| s[[i, j]]).sum();
            if score > best.1 {
                best = (j, score);
            }
        }
        *exemplar = best.0;
    }

    exemplars.sort_unstable();
    exemplars.dedup();
    nearest_exemplar(&exemplars)
        .into_iter()
        .map(|pos| pos as i32)
        .collect()
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::SeedableRng;

    use super::*;

    fn groups() -> Array2<f64> {
        array![
            [1.0, 1.0],
            [1.1, 0.9],
            [0.9, 1.0],
            [8.0, 8.0],
            [8.1, 7.9],
            [7.9, 8.1],
        ]
    }

    #[test]
    fn finds_two_exemplars() {
        let x = groups();
        let fitted = AffinityParams::default()
            .fit(x.view(), &mut RunRng::seed_from_u64(2))
            .unwrap();
        assert!(fitted.labels[..3].iter().all(|&l| l == fitted.labels[0]));
        assert!(fitted.labels[3..].iter().all(|&l| l == fitted.labels[3]));
        assert_ne!(fitted.labels[0], fitted.labels[3]);
        assert_eq!(fitted.labels[0], 0);
    }

    #[test]
    fn damping_range_is_enforced() {
        let x = groups();
        let mut rng = RunRng::seed_from_u64(0);
        for bad in [0.49, 1.0, 1.012] {
            let err = AffinityParams::default()
                .with_damping(bad)
                .fit(x.view(), &mut rng)
                .unwrap_err();
            assert!(matches!(err, ClusterError::InvalidParameter { name: "damping", .. }));
        }
        assert!(AffinityParams::default()
            .with_damping(0.996)
            .fit(x.view(), &mut rng)
            .is_ok());
    }

    #[test]
    fn non_convergence_labels_everything_noise() {
        let x = groups();
        let params = AffinityParams {
            max_iter: 1,
            convergence_iter: 15,
            ..AffinityParams::default()
        };
        let fitted = params.fit(x.view(), &mut RunRng::seed_from_u64(0)).unwrap();
        assert_eq!(fitted.labels, vec![NOISE; 6]);
    }

    #[test]
    fn single_sample() {
        let fitted = AffinityParams::default()
            .fit(array![[3.0]].view(), &mut RunRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(fitted.labels, vec![0]);
    }

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
    }
}
