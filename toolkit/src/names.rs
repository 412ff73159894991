//! Registry of toolkit and algorithm identifiers.
//!
//! These strings appear in output paths and reports, so they are part of the
//! on-disk format.

/// Library defaults, no tolerance override.
pub const TOOLKIT_VANILLA: &str = "clusterbench";
/// Toolkit-level tolerance applied to k-means and Gaussian mixture.
pub const TOOLKIT_TOLERANCE: &str = "clusterbench_tol";
/// Reserved; every algorithm operation is unsupported.
pub const TOOLKIT_FAST: &str = "clusterbench_fast";

pub const TOOLKITS: [&str; 3] = [TOOLKIT_VANILLA, TOOLKIT_TOLERANCE, TOOLKIT_FAST];

pub const KMEANS_PLUS_PLUS: &str = "kmeans_plus_plus";
pub const KMEANS_RANDOM: &str = "kmeans_random";
pub const KMEANS: &str = "kmeans";
pub const GAUSSIAN: &str = "gaussian";
pub const HIERARCHICAL: &str = "hierarchical";
pub const MEANSHIFT: &str = "meanshift";
pub const SPECTRAL: &str = "spectral";
pub const DBSCAN: &str = "dbscan";
pub const AP: &str = "ap";

pub const ALGORITHMS: [&str; 9] = [
    KMEANS_PLUS_PLUS,
    KMEANS_RANDOM,
    KMEANS,
    GAUSSIAN,
    HIERARCHICAL,
    MEANSHIFT,
    SPECTRAL,
    DBSCAN,
    AP,
];

/// Key of the centroid file in a run's artifact map.
pub const CENTROIDS_ARTIFACT: &str = "centroids";
