use ndarray::ArrayView2;

use crate::ClusterError;

/// Checks that `records` is non-empty with finite values. Returns the
/// feature dimension.
pub(crate) fn validate_data(records: ArrayView2<'_, f64>, op: &str) -> Result<usize, ClusterError> {
    if records.nrows() == 0 {
        return Err(ClusterError::InvalidInput(format!("{op}: empty data")));
    }
    if records.ncols() == 0 {
        return Err(ClusterError::InvalidInput(format!("{op}: rows have no features")));
    }
    if let Some(i) = records
        .rows()
        .into_iter()
        .position(|row| row.iter().any(|x| !x.is_finite()))
    {
        return Err(ClusterError::InvalidInput(format!(
            "{op}: row {i} contains non-finite values"
        )));
    }
    Ok(records.ncols())
}

pub(crate) fn validate_n_clusters(
    name: &'static str,
    k: usize,
    n_samples: usize,
) -> Result<(), ClusterError> {
    if k == 0 {
        return Err(ClusterError::param(name, "must be at least 1"));
    }
    if k > n_samples {
        return Err(ClusterError::param(
            name,
            format!("{k} exceeds the number of samples ({n_samples})"),
        ));
    }
    Ok(())
}
