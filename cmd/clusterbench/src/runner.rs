//! Benchmark execution and reporting.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use clusterbench_dataset::Dataset;
use clusterbench_toolkit::{AlgorithmRequest, RunContext, Toolkit};
use serde::{Deserialize, Serialize};

/// Result of one algorithm run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub algorithm: String,
    pub run_number: u32,
    pub duration_ms: i64,
    pub status: String, // "ok", "error"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub artifacts: BTreeMap<String, PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate results for one algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmSummary {
    pub algorithm: String,
    pub runs: usize,
    pub ok: usize,
    pub errors: usize,
    pub p50_ms: i64,
    pub p95_ms: i64,
    pub max_ms: i64,
}

/// Full benchmark report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    pub toolkit: String,
    pub dataset: String,
    pub rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub summaries: Vec<AlgorithmSummary>,
    pub results: Vec<RunResult>,
}

impl BenchmarkReport {
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.status == "error").count()
    }
}

/// Runs every request for every run number in order. Failures are recorded
/// and do not stop the benchmark.
pub fn run_benchmark(
    toolkit: &Toolkit,
    dataset: &Dataset,
    dataset_name: &str,
    requests: &[AlgorithmRequest],
    runs: impl IntoIterator<Item = u32>,
    seed: Option<u64>,
) -> Result<BenchmarkReport> {
    let start_time = Utc::now();
    let mut results = Vec::new();

    for run_number in runs {
        let mut ctx = RunContext::new(run_number, dataset_name)?;
        if let Some(seed) = seed {
            ctx = ctx.with_seed(seed);
        }

        for request in requests {
            let start = Instant::now();
            let outcome = toolkit.run(request, dataset, &ctx);
            let duration_ms = elapsed_ms(start.elapsed());

            let result = match outcome {
                Ok(out) => RunResult {
                    algorithm: request.identity().to_string(),
                    run_number,
                    duration_ms,
                    status: "ok".to_string(),
                    output: Some(out.output),
                    artifacts: out.artifacts,
                    error: None,
                },
                Err(e) => {
                    tracing::error!(
                        algorithm = request.identity(),
                        run = run_number,
                        error = %e,
                        "run failed"
                    );
                    RunResult {
                        algorithm: request.identity().to_string(),
                        run_number,
                        duration_ms,
                        status: "error".to_string(),
                        output: None,
                        artifacts: BTreeMap::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }
    }

    Ok(BenchmarkReport {
        timestamp: start_time.to_rfc3339(),
        finished_at: Some(Utc::now().to_rfc3339()),
        toolkit: toolkit.toolkit_name().to_string(),
        dataset: dataset_name.to_string(),
        rows: dataset.len(),
        seed,
        summaries: summarize(requests, &results),
        results,
    })
}

/// One summary per distinct algorithm, in request order.
fn summarize(requests: &[AlgorithmRequest], results: &[RunResult]) -> Vec<AlgorithmSummary> {
    let mut seen: Vec<&str> = Vec::new();
    for request in requests {
        if !seen.contains(&request.identity()) {
            seen.push(request.identity());
        }
    }

    seen.into_iter()
        .map(|algorithm| {
            let runs: Vec<&RunResult> =
                results.iter().filter(|r| r.algorithm == algorithm).collect();
            let ok = runs.iter().filter(|r| r.status == "ok").count();
            let durations: Vec<i64> = runs.iter().map(|r| r.duration_ms).collect();
            let (p50_ms, p95_ms, max_ms) = calc_percentiles(&durations);
            AlgorithmSummary {
                algorithm: algorithm.to_string(),
                runs: runs.len(),
                ok,
                errors: runs.len() - ok,
                p50_ms,
                p95_ms,
                max_ms,
            }
        })
        .collect()
}

/// p50, p95 and max of durations.
fn calc_percentiles(durations: &[i64]) -> (i64, i64, i64) {
    if durations.is_empty() {
        return (0, 0, 0);
    }

    let mut sorted = durations.to_vec();
    sorted.sort();

    let n = sorted.len();
    let p50 = sorted[(n - 1) * 50 / 100];
    let p95 = sorted[(n - 1) * 95 / 100];
    (p50, p95, sorted[n - 1])
}

/// Save report to file.
pub fn save_report(report: &BenchmarkReport, path: &Path) -> Result<()> {
    let data = serde_json::to_string_pretty(report)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Print benchmark summary.
pub fn print_summary(report: &BenchmarkReport) {
    println!("\n{}", "=".repeat(80));
    println!(
        "BENCHMARK SUMMARY  toolkit={} dataset={} rows={}",
        report.toolkit, report.dataset, report.rows
    );
    println!("{}", "=".repeat(80));

    println!(
        "\n{:<20} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10}",
        "Algorithm", "Runs", "Ok", "Errors", "P50(ms)", "P95(ms)", "Max(ms)"
    );
    println!("{}", "-".repeat(80));
    for s in &report.summaries {
        println!(
            "{:<20} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10}",
            s.algorithm, s.runs, s.ok, s.errors, s.p50_ms, s.p95_ms, s.max_ms
        );
    }
    println!("{}", "-".repeat(80));

    let failed: Vec<&RunResult> =
        report.results.iter().filter(|r| r.status == "error").collect();
    if !failed.is_empty() {
        println!("\nFailures:");
        for r in failed {
            println!(
                "  {} run {}: {}",
                r.algorithm,
                r.run_number,
                r.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Whole milliseconds, saturating at `i64::MAX`.
fn elapsed_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use clusterbench_toolkit::Variant;

    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_features(
            "tiny",
            vec![
                vec![0.0, 0.0],
                vec![0.1, 0.1],
                vec![0.0, 0.2],
                vec![3.0, 3.0],
                vec![3.1, 3.0],
                vec![3.0, 3.2],
            ],
        )
        .unwrap()
    }

    #[test]
    fn percentiles() {
        assert_eq!(calc_percentiles(&[]), (0, 0, 0));
        assert_eq!(calc_percentiles(&[5]), (5, 5, 5));
        assert_eq!(calc_percentiles(&[4, 1, 3, 2]), (2, 3, 4));
    }

    #[test]
    fn records_successes_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = Toolkit::new(Variant::Default, dir.path());
        let requests = vec![
            AlgorithmRequest::Hierarchical { n_clusters: 2 },
            // More clusters than rows.
            AlgorithmRequest::KMeansRandom {
                n_clusters: 9,
                max_iter: None,
            },
        ];

        let report =
            run_benchmark(&toolkit, &dataset(), "tiny", &requests, 1..=2, Some(3)).unwrap();
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.toolkit, "clusterbench");
        assert_eq!(report.rows, 6);

        let hierarchical = &report.summaries[0];
        assert_eq!(hierarchical.algorithm, "hierarchical");
        assert_eq!((hierarchical.runs, hierarchical.ok, hierarchical.errors), (2, 2, 0));
        let kmeans = &report.summaries[1];
        assert_eq!((kmeans.runs, kmeans.ok, kmeans.errors), (2, 0, 2));

        let first = &report.results[0];
        assert_eq!(first.status, "ok");
        assert!(first.output.as_ref().unwrap().is_file());
        assert!(report.results[1].error.is_some());
    }

    #[test]
    fn report_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = Toolkit::new(Variant::Default, dir.path().join("out"));
        let requests = vec![AlgorithmRequest::KMeansPlusPlus {
            n_clusters: 2,
            max_iter: None,
        }];
        let report = run_benchmark(&toolkit, &dataset(), "tiny", &requests, 1..=1, None).unwrap();

        let path = dir.path().join("report.json");
        save_report(&report, &path).unwrap();
        let loaded: BenchmarkReport =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].artifacts.len(), 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&loaded.timestamp).is_ok());
    }

    #[test]
    fn elapsed_ms_saturates() {
        assert_eq!(elapsed_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(elapsed_ms(Duration::from_secs(u64::MAX)), i64::MAX);
    }
}
