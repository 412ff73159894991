use std::fmt;

use ndarray::{Array2, ArrayView2};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::affinity::AffinityParams;
use crate::dbscan::DbscanParams;
use crate::gmm::GmmParams;
use crate::hierarchical::HierarchicalParams;
use crate::kmeans::KMeansParams;
use crate::mean_shift::MeanShiftParams;
use crate::spectral::SpectralParams;
use crate::ClusterError;

/// Random source threaded through every fit.
///
/// ChaCha8 keeps a seeded stream identical across platforms and rand releases.
pub type RunRng = ChaCha8Rng;

/// Label assigned to points that belong to no cluster.
pub const NOISE: i32 = -1;

/// Child generator for library code that clones its rng. Advances `rng`, so
/// two forks from the same stream differ.
pub(crate) fn fork(rng: &mut RunRng) -> RunRng {
    RunRng::seed_from_u64(rng.next_u64())
}

/// Output of a fitted clustering algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Fitted {
    /// One label per input row, in input order.
    pub labels: Vec<i32>,

    /// Cluster representatives, one row per cluster, for algorithms that
    /// produce them.
    pub centroids: Option<Array2<f64>>,
}

impl Fitted {
    pub fn labels_only(labels: Vec<i32>) -> Self {
        Self {
            labels,
            centroids: None,
        }
    }

    /// Number of distinct non-noise labels.
    pub fn n_clusters(&self) -> usize {
        let mut seen: Vec<i32> = self.labels.iter().copied().filter(|&l| l != NOISE).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

/// A configured clustering method.
pub trait Algorithm {
    /// Which family this configuration belongs to.
    fn family(&self) -> Family;

    /// Clusters `records` (one row per observation), drawing randomness from
    /// `rng` only.
    fn fit(&self, records: ArrayView2<'_, f64>, rng: &mut RunRng) -> Result<Fitted, ClusterError>;
}

/// The fixed algorithm catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    KMeans,
    GaussianMixture,
    Hierarchical,
    MeanShift,
    Spectral,
    Dbscan,
    AffinityPropagation,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::KMeans,
        Family::GaussianMixture,
        Family::Hierarchical,
        Family::MeanShift,
        Family::Spectral,
        Family::Dbscan,
        Family::AffinityPropagation,
    ];

    /// Whether fitted models expose explicit centroid vectors.
    pub fn produces_centroids(self) -> bool {
        matches!(self, Family::KMeans | Family::MeanShift)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Family::KMeans => "kmeans",
            Family::GaussianMixture => "gaussian",
            Family::Hierarchical => "hierarchical",
            Family::MeanShift => "meanshift",
            Family::Spectral => "spectral",
            Family::Dbscan => "dbscan",
            Family::AffinityPropagation => "ap",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one algorithm invocation, tagged by family.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    KMeans(KMeansParams),
    GaussianMixture(GmmParams),
    Hierarchical(HierarchicalParams),
    MeanShift(MeanShiftParams),
    Spectral(SpectralParams),
    Dbscan(DbscanParams),
    AffinityPropagation(AffinityParams),
}

impl Algorithm for Params {
    fn family(&self) -> Family {
        match self {
            Params::KMeans(p) => p.family(),
            Params::GaussianMixture(p) => p.family(),
            Params::Hierarchical(p) => p.family(),
            Params::MeanShift(p) => p.family(),
            Params::Spectral(p) => p.family(),
            Params::Dbscan(p) => p.family(),
            Params::AffinityPropagation(p) => p.family(),
        }
    }

    fn fit(&self, records: ArrayView2<'_, f64>, rng: &mut RunRng) -> Result<Fitted, ClusterError> {
        match self {
            Params::KMeans(p) => p.fit(records, rng),
            Params::GaussianMixture(p) => p.fit(records, rng),
            Params::Hierarchical(p) => p.fit(records, rng),
            Params::MeanShift(p) => p.fit(records, rng),
            Params::Spectral(p) => p.fit(records, rng),
            Params::Dbscan(p) => p.fit(records, rng),
            Params::AffinityPropagation(p) => p.fit(records, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_producers() {
        let producers: Vec<Family> = Family::ALL
            .into_iter()
            .filter(|f| f.produces_centroids())
            .collect();
        assert_eq!(producers, vec![Family::KMeans, Family::MeanShift]);
    }

    #[test]
    fn n_clusters_ignores_noise() {
        let fitted = Fitted::labels_only(vec![0, 1, NOISE, 1, 2, NOISE]);
        assert_eq!(fitted.n_clusters(), 3);
    }

    #[test]
    fn forks_advance_the_parent() {
        let mut rng = RunRng::seed_from_u64(5);
        let mut a = fork(&mut rng);
        let mut b = fork(&mut rng);
        assert_ne!(a.next_u64(), b.next_u64());

        let mut c = fork(&mut RunRng::seed_from_u64(5));
        let mut d = fork(&mut RunRng::seed_from_u64(5));
        assert_eq!(c.next_u64(), d.next_u64());
    }

    #[test]
    fn family_names_are_unique() {
        let mut names: Vec<&str> = Family::ALL.iter().map(|f| f.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Family::ALL.len());
    }
}
