use std::fmt;

use clusterbench_cluster::Family;

use crate::names;

/// One algorithm invocation with its caller-supplied arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmRequest {
    KMeansPlusPlus {
        n_clusters: usize,
        max_iter: Option<usize>,
    },
    KMeansRandom {
        n_clusters: usize,
        max_iter: Option<usize>,
    },
    /// k-means started from the given centroids, one per cluster.
    KMeans {
        n_clusters: usize,
        centroids: Vec<Vec<f64>>,
        max_iter: Option<usize>,
    },
    Gaussian {
        n_components: usize,
    },
    Hierarchical {
        n_clusters: usize,
    },
    MeanShift,
    Spectral {
        n_clusters: usize,
    },
    Dbscan,
    AffinityPropagation,
}

impl AlgorithmRequest {
    /// Registry name, also the algorithm directory in output paths.
    pub fn identity(&self) -> &'static str {
        match self {
            AlgorithmRequest::KMeansPlusPlus { .. } => names::KMEANS_PLUS_PLUS,
            AlgorithmRequest::KMeansRandom { .. } => names::KMEANS_RANDOM,
            AlgorithmRequest::KMeans { .. } => names::KMEANS,
            AlgorithmRequest::Gaussian { .. } => names::GAUSSIAN,
            AlgorithmRequest::Hierarchical { .. } => names::HIERARCHICAL,
            AlgorithmRequest::MeanShift => names::MEANSHIFT,
            AlgorithmRequest::Spectral { .. } => names::SPECTRAL,
            AlgorithmRequest::Dbscan => names::DBSCAN,
            AlgorithmRequest::AffinityPropagation => names::AP,
        }
    }

    pub fn family(&self) -> Family {
        match self {
            AlgorithmRequest::KMeansPlusPlus { .. }
            | AlgorithmRequest::KMeansRandom { .. }
            | AlgorithmRequest::KMeans { .. } => Family::KMeans,
            AlgorithmRequest::Gaussian { .. } => Family::GaussianMixture,
            AlgorithmRequest::Hierarchical { .. } => Family::Hierarchical,
            AlgorithmRequest::MeanShift => Family::MeanShift,
            AlgorithmRequest::Spectral { .. } => Family::Spectral,
            AlgorithmRequest::Dbscan => Family::Dbscan,
            AlgorithmRequest::AffinityPropagation => Family::AffinityPropagation,
        }
    }
}

impl fmt::Display for AlgorithmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}
