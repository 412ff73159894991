use std::path::{Path, PathBuf};

use crate::{RunContext, ToolkitError};

/// Where a run's files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub output: PathBuf,
    /// Set only when the caller asked for a centroid file.
    pub centroids: Option<PathBuf>,
}

/// Derives output paths from the run identity.
pub trait OutputLayout {
    fn paths(
        &self,
        ctx: &RunContext,
        toolkit: &str,
        algorithm: &str,
        needs_centroids: bool,
    ) -> Result<OutputPaths, ToolkitError>;
}

/// `<root>/<dataset>/<toolkit>/<algorithm>/<stem>.csv`, with the centroids
/// next to it as `<stem>.centroids.csv`.
#[derive(Debug, Clone)]
pub struct DirectoryLayout {
    root: PathBuf,
}

impl DirectoryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputLayout for DirectoryLayout {
    fn paths(
        &self,
        ctx: &RunContext,
        toolkit: &str,
        algorithm: &str,
        needs_centroids: bool,
    ) -> Result<OutputPaths, ToolkitError> {
        let stem = ctx.file_stem();
        let dir = self
            .root
            .join(component("dataset name", ctx.dataset_name())?)
            .join(component("toolkit", toolkit)?)
            .join(component("algorithm", algorithm)?);
        let stem = component("run info", &stem)?;

        Ok(OutputPaths {
            output: dir.join(format!("{stem}.csv")),
            centroids: needs_centroids.then(|| dir.join(format!("{stem}.centroids.csv"))),
        })
    }
}

/// Rejects values that would escape or restructure the layout.
fn component<'a>(what: &'static str, value: &'a str) -> Result<&'a str, ToolkitError> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if bad {
        return Err(ToolkitError::InvalidPathComponent {
            what,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_by_dataset_toolkit_algorithm() {
        let layout = DirectoryLayout::new("/out");
        let ctx = RunContext::new(3, "iris").unwrap().with_run_info("r3");

        let paths = layout.paths(&ctx, "clusterbench", "kmeans", true).unwrap();
        assert_eq!(paths.output, PathBuf::from("/out/iris/clusterbench/kmeans/r3.csv"));
        assert_eq!(
            paths.centroids,
            Some(PathBuf::from("/out/iris/clusterbench/kmeans/r3.centroids.csv"))
        );

        let paths = layout.paths(&ctx, "clusterbench", "dbscan", false).unwrap();
        assert_eq!(paths.centroids, None);
    }

    #[test]
    fn default_stem_uses_run_number() {
        let layout = DirectoryLayout::new("out");
        let ctx = RunContext::new(12, "wine").unwrap();
        let paths = layout.paths(&ctx, "clusterbench_tol", "ap", false).unwrap();
        assert_eq!(paths.output, Path::new("out/wine/clusterbench_tol/ap/run12.csv"));
    }

    #[test]
    fn rejects_escaping_components() {
        let layout = DirectoryLayout::new("out");
        for info in ["", "..", "a/b", "a\\b"] {
            let ctx = RunContext::new(1, "iris").unwrap().with_run_info(info);
            let err = layout.paths(&ctx, "clusterbench", "kmeans", false).unwrap_err();
            assert!(matches!(err, ToolkitError::InvalidPathComponent { what: "run info", .. }));
        }
        let ctx = RunContext::new(1, "../etc").unwrap();
        assert!(layout.paths(&ctx, "clusterbench", "kmeans", false).is_err());
    }
}
