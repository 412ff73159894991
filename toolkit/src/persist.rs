//! On-disk format of clustering output.
//!
//! Clustering files hold one `index,label` line per row. Centroid files hold
//! one comma-separated line per centroid, floats in shortest round-trip form.
//! Both are written fresh on every run.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::ToolkitError;

/// Writes normalized output somewhere.
pub trait Persistence {
    fn save_clustering(&self, clustering: &[(usize, i32)], path: &Path) -> Result<(), ToolkitError>;

    fn save_centroids(&self, centroids: &[Vec<f64>], path: &Path) -> Result<(), ToolkitError>;
}

/// Plain CSV files. Missing parent directories are created.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvPersistence;

impl Persistence for CsvPersistence {
    fn save_clustering(&self, clustering: &[(usize, i32)], path: &Path) -> Result<(), ToolkitError> {
        write_lines(path, |w| {
            for (index, label) in clustering {
                writeln!(w, "{index},{label}")?;
            }
            Ok(())
        })
    }

    fn save_centroids(&self, centroids: &[Vec<f64>], path: &Path) -> Result<(), ToolkitError> {
        write_lines(path, |w| {
            for centroid in centroids {
                let mut sep = "";
                for v in centroid {
                    write!(w, "{sep}{v}")?;
                    sep = ",";
                }
                writeln!(w)?;
            }
            Ok(())
        })
    }
}

fn write_lines<F>(path: &Path, body: F) -> Result<(), ToolkitError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ToolkitError::io(parent))?;
    }
    let file = File::create(path).map_err(ToolkitError::io(path))?;
    let mut w = BufWriter::new(file);
    body(&mut w)
        .and_then(|()| w.flush())
        .map_err(ToolkitError::io(path))
}

/// Reads a centroid file written by [`CsvPersistence`], e.g. to seed an
/// explicit k-means run. Blank lines are skipped.
pub fn load_centroids(path: &Path) -> Result<Vec<Vec<f64>>, ToolkitError> {
    let mut centroids: Vec<Vec<f64>> = Vec::new();
    for_each_line(path, |line| {
        let centroid = line
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("bad value: {e}"))?;
        if let Some(first) = centroids.first() {
            if first.len() != centroid.len() {
                return Err(format!(
                    "expected {} values, got {}",
                    first.len(),
                    centroid.len()
                ));
            }
        }
        centroids.push(centroid);
        Ok(())
    })?;
    Ok(centroids)
}

/// Reads a clustering file written by [`CsvPersistence`].
pub fn load_clustering(path: &Path) -> Result<Vec<(usize, i32)>, ToolkitError> {
    let mut pairs: Vec<(usize, i32)> = Vec::new();
    for_each_line(path, |line| {
        let (index, label) = line
            .split_once(',')
            .ok_or_else(|| "expected index,label".to_string())?;
        let index = index.trim().parse::<usize>().map_err(|e| format!("bad index: {e}"))?;
        let label = label.trim().parse::<i32>().map_err(|e| format!("bad label: {e}"))?;
        pairs.push((index, label));
        Ok(())
    })?;
    Ok(pairs)
}

fn for_each_line<F>(path: &Path, mut f: F) -> Result<(), ToolkitError>
where
    F: FnMut(&str) -> Result<(), String>,
{
    let file = File::open(path).map_err(ToolkitError::io(path))?;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(ToolkitError::io(path))?;
        if line.trim().is_empty() {
            continue;
        }
        f(&line).map_err(|reason| ToolkitError::Format {
            path: path.to_path_buf(),
            line: i + 1,
            reason,
        })?;
    }
    Ok(())
}
