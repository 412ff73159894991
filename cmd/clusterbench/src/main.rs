//! clusterbench - run a clustering benchmark plan.

mod config;
mod runner;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clusterbench_dataset::Dataset;
use clusterbench_toolkit::{names, ToleranceConfig, Toolkit, Variant};
use tracing_subscriber::EnvFilter;

/// Runs a fixed catalogue of clustering algorithms against a dataset and
/// writes one clustering file per run.
#[derive(Parser, Debug)]
#[command(name = "clusterbench")]
#[command(about = "Clustering benchmark harness")]
#[command(version)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a benchmark plan (YAML or JSON)
    Run(RunArgs),
    /// List toolkit names and algorithm identities
    List,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Plan file
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Seed for every run (overrides the plan)
    #[arg(long)]
    seed: Option<u64>,

    /// Output root (overrides the plan)
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Toolkit name (overrides the plan)
    #[arg(long)]
    toolkit: Option<String>,

    /// Tolerance for clusterbench_tol (overrides the plan)
    #[arg(long)]
    tolerance: Option<String>,

    /// Output JSON report to file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Quiet mode (no summary)
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::List => {
            list();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let mut plan = config::load_plan(&args.config)?;
    if let Some(seed) = args.seed {
        plan.seed = Some(seed);
    }
    if let Some(root) = args.output_root {
        plan.output = root;
    }
    if let Some(toolkit) = args.toolkit {
        plan.toolkit = toolkit;
    }
    if let Some(tolerance) = args.tolerance {
        plan.tolerance = Some(config::ToleranceValue::Text(tolerance));
    }

    let variant = plan.variant()?;
    let dataset = Dataset::from_csv_path(&plan.dataset.path, &plan.dataset.csv_options())
        .with_context(|| format!("load dataset {}", plan.dataset.path.display()))?;
    let dataset_name = plan
        .dataset
        .name
        .clone()
        .unwrap_or_else(|| dataset.name().to_string());

    let base = config::plan_dir(&args.config);
    let requests = plan
        .algorithms
        .iter()
        .map(|spec| spec.to_request(base))
        .collect::<Result<Vec<_>>>()?;

    if !args.quiet {
        println!(
            "=== {} | dataset {} ({} rows, {} features) | runs {}..={} ===",
            variant,
            dataset_name,
            dataset.len(),
            dataset.dim(),
            plan.runs.from,
            plan.runs.to
        );
        for request in &requests {
            println!("  - {request}");
        }
    }

    let toolkit = Toolkit::new(variant, &plan.output).spectral_retry(plan.spectral_retry);
    let report = runner::run_benchmark(
        &toolkit,
        &dataset,
        &dataset_name,
        &requests,
        plan.runs.iter(),
        plan.seed,
    )?;

    if !args.quiet {
        runner::print_summary(&report);
    }

    if let Some(output) = &args.output {
        runner::save_report(&report, output)?;
        println!("\nReport saved to {}", output.display());
    }

    let errors = report.error_count();
    if errors > 0 {
        anyhow::bail!("{errors} of {} runs failed", report.results.len());
    }
    Ok(())
}

fn list() {
    println!("Toolkits:");
    for name in names::TOOLKITS {
        let variant = Variant::from_name(name, ToleranceConfig::None);
        let note = match variant {
            Ok(v) if !v.is_implemented() => " (not implemented)",
            _ => "",
        };
        println!("  {name}{note}");
    }
    println!("\nAlgorithms:");
    for name in names::ALGORITHMS {
        println!("  {name}");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "clusterbench",
            "-v",
            "run",
            "-c",
            "plan.yaml",
            "--seed",
            "9",
            "--toolkit",
            "clusterbench_tol",
            "--tolerance",
            "0.01",
            "-o",
            "report.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("plan.yaml"));
                assert_eq!(args.seed, Some(9));
                assert_eq!(args.toolkit.as_deref(), Some("clusterbench_tol"));
                assert_eq!(args.tolerance.as_deref(), Some("0.01"));
                assert_eq!(args.output, Some(PathBuf::from("report.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_writes_outputs_and_report() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("points.csv"),
            "id,x,y,label\n10,0,0,a\n11,0.1,0.1,a\n12,0,0.2,a\n13,4,4,b\n14,4.1,4,b\n15,4,4.2,b\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("plan.yaml"),
            "dataset: {path: points.csv, target: label, index_column: id}\n\
             seed: 1\n\
             runs: {from: 1, to: 2}\n\
             algorithms:\n\
             \x20 - {algorithm: kmeans_plus_plus, n_clusters: 2}\n\
             \x20 - {algorithm: dbscan}\n",
        )
        .unwrap();

        let report_path = dir.path().join("report.json");
        run(RunArgs {
            config: dir.path().join("plan.yaml"),
            seed: None,
            output_root: None,
            toolkit: None,
            tolerance: None,
            output: Some(report_path.clone()),
            quiet: true,
        })
        .unwrap();

        let base = dir.path().join("output/points/clusterbench");
        assert!(base.join("kmeans_plus_plus/run1.csv").is_file());
        assert!(base.join("kmeans_plus_plus/run2.centroids.csv").is_file());
        assert!(base.join("dbscan/run2.csv").is_file());
        assert_eq!(
            fs::read_to_string(base.join("dbscan/run1.csv")).unwrap(),
            "10,0\n11,0\n12,0\n13,1\n14,1\n15,1\n"
        );
        assert!(report_path.is_file());
    }
}
