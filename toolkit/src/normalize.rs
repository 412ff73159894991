//! Canonical form of a clustering run.

use clusterbench_cluster::Fitted;
use clusterbench_dataset::Dataset;
use ndarray::{Array2, ArrayView2};

use crate::ToolkitError;

/// Per-row labels in dataset row order.
pub trait LabelSource {
    fn labels(&self) -> &[i32];
}

impl LabelSource for [i32] {
    fn labels(&self) -> &[i32] {
        self
    }
}

impl LabelSource for Vec<i32> {
    fn labels(&self) -> &[i32] {
        self
    }
}

impl LabelSource for Fitted {
    fn labels(&self) -> &[i32] {
        &self.labels
    }
}

/// Cluster representatives, if the model has any.
pub trait CentroidSource {
    fn centroids(&self) -> Option<ArrayView2<'_, f64>>;
}

impl CentroidSource for Fitted {
    fn centroids(&self) -> Option<ArrayView2<'_, f64>> {
        self.centroids.as_ref().map(Array2::view)
    }
}

impl CentroidSource for Array2<f64> {
    fn centroids(&self) -> Option<ArrayView2<'_, f64>> {
        Some(self.view())
    }
}

/// Pairs every dataset row index with the label at the same position.
///
/// Row order is preserved and nothing is filtered or deduplicated. The label
/// count must equal the row count.
pub fn normalize_clustering<S>(dataset: &Dataset, source: &S) -> Result<Vec<(usize, i32)>, ToolkitError>
where
    S: LabelSource + ?Sized,
{
    let labels = source.labels();
    if labels.len() != dataset.len() {
        return Err(ToolkitError::ShapeMismatch {
            rows: dataset.len(),
            labels: labels.len(),
        });
    }
    Ok(dataset.indices().zip(labels.iter().copied()).collect())
}

/// Centroid vectors in the model's native order.
pub fn normalize_centroids<S>(source: &S) -> Result<Vec<Vec<f64>>, ToolkitError>
where
    S: CentroidSource + ?Sized,
{
    let centroids = source.centroids().ok_or(ToolkitError::MissingCentroids)?;
    Ok(centroids.rows().into_iter().map(|row| row.to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use clusterbench_dataset::Row;
    use ndarray::array;

    use super::*;

    fn shuffled() -> Dataset {
        let rows = [3usize, 1, 2]
            .into_iter()
            .map(|index| Row {
                index,
                features: vec![index as f64],
            })
            .collect();
        Dataset::new("shuffled", vec!["x".into()], rows).unwrap()
    }

    #[test]
    fn keeps_dataset_row_order() {
        let pairs = normalize_clustering(&shuffled(), &vec![0, 1, 0]).unwrap();
        assert_eq!(pairs, vec![(3, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn accepts_slices_and_models() {
        let labels: &[i32] = &[-1, -1, 4];
        assert_eq!(
            normalize_clustering(&shuffled(), labels).unwrap(),
            vec![(3, -1), (1, -1), (2, 4)]
        );

        let fitted = Fitted::labels_only(vec![2, 2, 2]);
        assert_eq!(
            normalize_clustering(&shuffled(), &fitted).unwrap(),
            vec![(3, 2), (1, 2), (2, 2)]
        );
    }

    #[test]
    fn short_or_long_label_sources_are_shape_errors() {
        let err = normalize_clustering(&shuffled(), &vec![0, 1]).unwrap_err();
        assert!(matches!(err, ToolkitError::ShapeMismatch { rows: 3, labels: 2 }));
        let err = normalize_clustering(&shuffled(), &vec![0; 4]).unwrap_err();
        assert!(matches!(err, ToolkitError::ShapeMismatch { rows: 3, labels: 4 }));
    }

    #[test]
    fn centroids_keep_model_order() {
        let fitted = Fitted {
            labels: vec![0, 1],
            centroids: Some(array![[9.0, 9.0], [0.0, 0.5]]),
        };
        assert_eq!(
            normalize_centroids(&fitted).unwrap(),
            vec![vec![9.0, 9.0], vec![0.0, 0.5]]
        );
        assert_eq!(
            normalize_centroids(&array![[1.0], [2.0]]).unwrap(),
            vec![vec![1.0], vec![2.0]]
        );

        let label_only = Fitted::labels_only(fitted.labels);
        assert!(matches!(
            normalize_centroids(&label_only),
            Err(ToolkitError::MissingCentroids)
        ));
    }
}
