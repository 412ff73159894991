use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::ToolkitError;

/// Identity of one benchmark run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    run_number: u32,
    dataset_name: String,
    run_info: Option<String>,
    seed: Option<u64>,
}

impl RunContext {
    /// Fails with [`ToolkitError::InvalidRunNumber`] for run 0.
    pub fn new(run_number: u32, dataset_name: impl Into<String>) -> Result<Self, ToolkitError> {
        if run_number == 0 {
            return Err(ToolkitError::InvalidRunNumber);
        }
        Ok(Self {
            run_number,
            dataset_name: dataset_name.into(),
            run_info: None,
            seed: None,
        })
    }

    /// Opaque tag used only to name output files.
    pub fn with_run_info(mut self, run_info: impl Into<String>) -> Self {
        self.run_info = Some(run_info.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn run_number(&self) -> u32 {
        self.run_number
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn run_info(&self) -> Option<&str> {
        self.run_info.as_deref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// File stem for this run's output: the run info, or `run<N>`.
    pub fn file_stem(&self) -> String {
        match &self.run_info {
            Some(info) => info.clone(),
            None => format!("run{}", self.run_number),
        }
    }
}

/// Files written by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutput {
    /// The clustering file.
    pub output: PathBuf,
    /// Auxiliary files by name. Empty for label-only algorithms.
    pub artifacts: BTreeMap<String, PathBuf>,
}
