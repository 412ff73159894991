use std::io;
use std::path::PathBuf;

use clusterbench_cluster::ClusterError;
use clusterbench_dataset::DatasetError;
use thiserror::Error;

/// Errors returned by toolkit operations.
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("toolkit: invalid tolerance {0:?}: not a number")]
    InvalidTolerance(String),

    #[error("toolkit: {toolkit} does not implement {operation}")]
    Unsupported {
        toolkit: &'static str,
        operation: &'static str,
    },

    #[error("toolkit: unknown toolkit {0:?}")]
    UnknownToolkit(String),

    #[error("toolkit: run number must be positive")]
    InvalidRunNumber,

    #[error("toolkit: {what} {value:?} cannot be used as a path component")]
    InvalidPathComponent { what: &'static str, value: String },

    #[error("toolkit: {labels} labels for {rows} dataset rows")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("toolkit: model has no centroids")]
    MissingCentroids,

    #[error("toolkit: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("toolkit: {path}: line {line}: {reason}")]
    Format {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl ToolkitError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| ToolkitError::Io { path, source }
    }
}
