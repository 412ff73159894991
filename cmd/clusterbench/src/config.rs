//! Benchmark plan loading.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clusterbench_dataset::CsvOptions;
use clusterbench_toolkit::{
    load_centroids, names, AlgorithmRequest, SpectralRetry, ToleranceConfig, Variant,
};
use serde::Deserialize;

/// A benchmark plan, read from YAML or JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    pub dataset: DatasetConfig,

    /// Root of the output tree.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Toolkit registry name.
    #[serde(default = "default_toolkit")]
    pub toolkit: String,

    /// Used by the tolerance toolkit only. Number or numeric string.
    #[serde(default)]
    pub tolerance: Option<ToleranceValue>,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub runs: RunRange,

    #[serde(default)]
    pub spectral_retry: SpectralRetry,

    pub algorithms: Vec<AlgorithmSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    /// Name used in output paths. Defaults to the file stem.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub index_column: Option<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl DatasetConfig {
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            delimiter: self.delimiter,
            target: self.target.clone(),
            index_column: self.index_column.clone(),
        }
    }
}

/// Tolerance as written in the plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ToleranceValue {
    Number(f64),
    Text(String),
}

impl ToleranceValue {
    pub fn resolve(&self) -> Result<ToleranceConfig> {
        match self {
            ToleranceValue::Number(tol) => Ok(ToleranceConfig::Fixed(*tol)),
            ToleranceValue::Text(text) => Ok(text.parse::<ToleranceConfig>()?),
        }
    }
}

/// Inclusive range of run numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunRange {
    pub from: u32,
    pub to: u32,
}

impl Default for RunRange {
    fn default() -> Self {
        Self { from: 1, to: 1 }
    }
}

impl RunRange {
    pub fn iter(self) -> std::ops::RangeInclusive<u32> {
        self.from..=self.to
    }
}

/// One algorithm entry of a plan, tagged by its registry name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum AlgorithmSpec {
    KmeansPlusPlus {
        n_clusters: usize,
        #[serde(default)]
        max_iter: Option<usize>,
    },
    KmeansRandom {
        n_clusters: usize,
        #[serde(default)]
        max_iter: Option<usize>,
    },
    /// Initial centroids are read from a file written by a previous run.
    Kmeans {
        n_clusters: usize,
        centroids: PathBuf,
        #[serde(default)]
        max_iter: Option<usize>,
    },
    Gaussian {
        n_clusters: usize,
    },
    Hierarchical {
        n_clusters: usize,
    },
    Meanshift,
    Spectral {
        n_clusters: usize,
    },
    Dbscan,
    Ap,
}

impl AlgorithmSpec {
    /// Builds the toolkit request. Relative centroid paths are resolved
    /// against `base_dir`.
    pub fn to_request(&self, base_dir: &Path) -> Result<AlgorithmRequest> {
        let request = match self {
            AlgorithmSpec::KmeansPlusPlus { n_clusters, max_iter } => {
                AlgorithmRequest::KMeansPlusPlus {
                    n_clusters: *n_clusters,
                    max_iter: *max_iter,
                }
            }
            AlgorithmSpec::KmeansRandom { n_clusters, max_iter } => AlgorithmRequest::KMeansRandom {
                n_clusters: *n_clusters,
                max_iter: *max_iter,
            },
            AlgorithmSpec::Kmeans {
                n_clusters,
                centroids,
                max_iter,
            } => {
                let path = base_dir.join(centroids);
                let centroids = load_centroids(&path)
                    .with_context(|| format!("load initial centroids {}", path.display()))?;
                AlgorithmRequest::KMeans {
                    n_clusters: *n_clusters,
                    centroids,
                    max_iter: *max_iter,
                }
            }
            AlgorithmSpec::Gaussian { n_clusters } => AlgorithmRequest::Gaussian {
                n_components: *n_clusters,
            },
            AlgorithmSpec::Hierarchical { n_clusters } => AlgorithmRequest::Hierarchical {
                n_clusters: *n_clusters,
            },
            AlgorithmSpec::Meanshift => AlgorithmRequest::MeanShift,
            AlgorithmSpec::Spectral { n_clusters } => AlgorithmRequest::Spectral {
                n_clusters: *n_clusters,
            },
            AlgorithmSpec::Dbscan => AlgorithmRequest::Dbscan,
            AlgorithmSpec::Ap => AlgorithmRequest::AffinityPropagation,
        };
        Ok(request)
    }
}

impl Plan {
    /// Resolves the toolkit variant, tolerance included.
    pub fn variant(&self) -> Result<Variant> {
        let tolerance = match &self.tolerance {
            Some(value) => value.resolve()?,
            None => ToleranceConfig::None,
        };
        Ok(Variant::from_name(&self.toolkit, tolerance)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs.from == 0 || self.runs.from > self.runs.to {
            bail!(
                "runs: need 1 <= from <= to, got {}..={}",
                self.runs.from,
                self.runs.to
            );
        }
        if self.algorithms.is_empty() {
            bail!("plan lists no algorithms");
        }
        Ok(())
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

fn default_toolkit() -> String {
    names::TOOLKIT_VANILLA.to_string()
}

fn default_delimiter() -> char {
    ','
}

/// Loads a plan, choosing the parser by file extension. Relative dataset and
/// output paths are resolved against the plan's directory.
pub fn load_plan(path: &Path) -> Result<Plan> {
    let data = std::fs::read(path).with_context(|| format!("read plan {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let mut plan: Plan = match ext {
        "json" => serde_json::from_slice(&data)?,
        "yaml" | "yml" => serde_yaml::from_slice(&data)?,
        _ => bail!("unsupported plan format {:?} (want .json, .yaml or .yml)", ext),
    };

    let base = plan_dir(path);
    plan.dataset.path = base.join(&plan.dataset.path);
    plan.output = base.join(&plan.output);
    plan.validate()?;
    Ok(plan)
}

/// Directory relative plan paths are resolved against.
pub fn plan_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clusterbench_toolkit::RetrySeeding;

    use super::*;

    const YAML: &str = r#"
dataset:
  path: data/iris.csv
  target: class
output: out
toolkit: clusterbench_tol
tolerance: "0.01"
seed: 42
runs: { from: 1, to: 3 }
spectral_retry:
  seeding: reseed
  max_attempts: 5
algorithms:
  - algorithm: kmeans_plus_plus
    n_clusters: 3
    max_iter: 50
  - algorithm: spectral
    n_clusters: 3
  - algorithm: dbscan
  - algorithm: ap
"#;

    #[test]
    fn parses_yaml_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        fs::write(&path, YAML).unwrap();

        let plan = load_plan(&path).unwrap();
        assert_eq!(plan.dataset.path, dir.path().join("data/iris.csv"));
        assert_eq!(plan.output, dir.path().join("out"));
        assert_eq!(plan.seed, Some(42));
        assert_eq!(plan.runs.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(plan.spectral_retry.seeding, RetrySeeding::Reseed);
        assert_eq!(plan.spectral_retry.max_attempts, Some(5));
        assert_eq!(plan.variant().unwrap(), Variant::Tolerance(ToleranceConfig::Fixed(0.01)));
        assert_eq!(
            plan.algorithms[0],
            AlgorithmSpec::KmeansPlusPlus {
                n_clusters: 3,
                max_iter: Some(50)
            }
        );
        assert_eq!(plan.algorithms[2], AlgorithmSpec::Dbscan);
    }

    #[test]
    fn parses_json_plan_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(
            &path,
            r#"{"dataset": {"path": "d.csv"}, "tolerance": 0.01, "algorithms": [{"algorithm": "meanshift"}]}"#,
        )
        .unwrap();

        let plan = load_plan(&path).unwrap();
        assert_eq!(plan.toolkit, "clusterbench");
        assert_eq!(plan.runs, RunRange::default());
        assert_eq!(plan.spectral_retry, SpectralRetry::default());
        assert_eq!(plan.dataset.delimiter, ',');
        // The vanilla toolkit ignores the tolerance.
        assert_eq!(plan.variant().unwrap(), Variant::Default);
        assert_eq!(plan.tolerance, Some(ToleranceValue::Number(0.01)));
    }

    #[test]
    fn numeric_and_string_tolerances_resolve_identically() {
        let number = ToleranceValue::Number(0.01).resolve().unwrap();
        let text = ToleranceValue::Text("0.01".into()).resolve().unwrap();
        assert_eq!(number, text);
        assert!(ToleranceValue::Text("loose".into()).resolve().is_err());
    }

    #[test]
    fn rejects_bad_run_ranges_and_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        fs::write(
            &path,
            "dataset: {path: d.csv}\nruns: {from: 0, to: 2}\nalgorithms: [{algorithm: dbscan}]\n",
        )
        .unwrap();
        assert!(load_plan(&path).is_err());

        let path = dir.path().join("plan.toml");
        fs::write(&path, "").unwrap();
        assert!(load_plan(&path).is_err());
    }

    #[test]
    fn kmeans_entry_loads_centroid_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("init.csv"), "0,0\n5,5\n").unwrap();
        let spec = AlgorithmSpec::Kmeans {
            n_clusters: 2,
            centroids: PathBuf::from("init.csv"),
            max_iter: None,
        };
        let request = spec.to_request(dir.path()).unwrap();
        assert_eq!(
            request,
            AlgorithmRequest::KMeans {
                n_clusters: 2,
                centroids: vec![vec![0.0, 0.0], vec![5.0, 5.0]],
                max_iter: None,
            }
        );
    }
}
