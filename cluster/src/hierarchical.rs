//! Agglomerative clustering. Linkage is computed by `kodama` over Euclidean
//! distances and the dendrogram is cut at `n_clusters`.

use kodama::{linkage, Method};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::distance::sq_dist;
use crate::model::{Algorithm, Family, Fitted, RunRng};
use crate::validation::{validate_data, validate_n_clusters};
use crate::ClusterError;

/// Inter-cluster distance used when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Minimum increase of within-cluster variance.
    #[default]
    Ward,
    Complete,
    Average,
    Single,
}

impl Linkage {
    fn method(self) -> Method {
        match self {
            Linkage::Ward => Method::Ward,
            Linkage::Complete => Method::Complete,
            Linkage::Average => Method::Average,
            Linkage::Single => Method::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalParams {
    pub n_clusters: usize,
    pub linkage: Linkage,
}

impl HierarchicalParams {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            linkage: Linkage::default(),
        }
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }
}

impl Algorithm for HierarchicalParams {
    fn family(&self) -> Family {
        Family::Hierarchical
    }

    fn fit(&self, records: ArrayView2<'_, f64>, _rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        validate_data(records, "hierarchical")?;
        let n = records.nrows();
        validate_n_clusters("n_clusters", self.n_clusters, n)?;
        if n == 1 {
            return Ok(Fitted::labels_only(vec![0]));
        }

        // Condensed upper triangle, row by row.
        let mut condensed = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                condensed.push(sq_dist(records.row(i), records.row(j)).sqrt());
            }
        }
        let dendrogram = linkage(&mut condensed, n, self.linkage.method());

        // Replay the first n - k merges. Step s creates cluster n + s.
        let mut parent: Vec<usize> = (0..n).collect();
        let mut representative: Vec<usize> = (0..n).collect();
        for step in dendrogram.steps().iter().take(n - self.n_clusters) {
            let a = find(&mut parent, representative[step.cluster1]);
            let b = find(&mut parent, representative[step.cluster2]);
            parent[b] = a;
            representative.push(a);
        }

        // Number clusters by first appearance in row order.
        let mut ids: Vec<Option<i32>> = vec![None; n];
        let mut next = 0;
        let labels = (0..n)
            .map(|i| {
                let root = find(&mut parent, i);
                *ids[root].get_or_insert_with(|| {
                    next += 1;
                    next - 1
                })
            })
            .collect();

        Ok(Fitted::labels_only(labels))
    }
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use rand::SeedableRng;

    use super::*;

    fn line() -> Array2<f64> {
        array![[0.0], [0.5], [1.0], [10.0], [10.5], [30.0]]
    }

    fn fit(x: &Array2<f64>, params: HierarchicalParams) -> Vec<i32> {
        params.fit(x.view(), &mut RunRng::seed_from_u64(0)).unwrap().labels
    }

    #[test]
    fn every_linkage_finds_the_gaps() {
        let x = line();
        for linkage in [Linkage::Ward, Linkage::Complete, Linkage::Average, Linkage::Single] {
            let labels = fit(&x, HierarchicalParams::new(3).with_linkage(linkage));
            assert_eq!(labels, vec![0, 0, 0, 1, 1, 2], "{linkage:?}");
        }
    }

    #[test]
    fn one_cluster_per_point() {
        assert_eq!(fit(&line(), HierarchicalParams::new(6)), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn single_cluster() {
        assert!(fit(&line(), HierarchicalParams::new(1)).iter().all(|&l| l == 0));
    }

    #[test]
    fn single_row() {
        assert_eq!(fit(&array![[4.0, 2.0]], HierarchicalParams::new(1)), vec![0]);
    }

    #[test]
    fn single_follows_the_chain_and_ward_splits_it() {
        // A chain of close points next to a tight pair: single linkage follows
        // the chain, Ward splits it by variance.
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [20.0], [20.1]];
        let single = fit(&x, HierarchicalParams::new(2).with_linkage(Linkage::Single));
        assert_eq!(single, vec![0, 0, 0, 0, 0, 0, 1, 1]);
        let ward = fit(&x, HierarchicalParams::new(3));
        assert_eq!(ward[6], ward[7]);
        assert_ne!(ward[0], ward[5]);
    }

    #[test]
    fn too_many_clusters() {
        let err = HierarchicalParams::new(7)
            .fit(line().view(), &mut RunRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, ClusterError::InvalidParameter { name: "n_clusters", .. }));
    }
}
