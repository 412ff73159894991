use std::collections::HashSet;

use ndarray::Array2;

use crate::DatasetError;

/// One observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Stable identifier, unique within the dataset.
    pub index: usize,
    pub features: Vec<f64>,
}

/// An ordered collection of rows sharing one feature dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    feature_names: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Builds a dataset, checking that every row has the same dimension and
    /// that indices are unique.
    pub fn new(
        name: impl Into<String>,
        feature_names: Vec<String>,
        rows: Vec<Row>,
    ) -> Result<Self, DatasetError> {
        let expected = feature_names.len();
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if row.features.len() != expected {
                return Err(DatasetError::DimensionMismatch {
                    index: row.index,
                    expected,
                    got: row.features.len(),
                });
            }
            if !seen.insert(row.index) {
                return Err(DatasetError::DuplicateIndex(row.index));
            }
        }
        Ok(Self {
            name: name.into(),
            feature_names,
            rows,
        })
    }

    /// Builds a dataset whose row indices are positions `0..n`. Feature names
    /// are `x0, x1, ...`.
    pub fn from_features(
        name: impl Into<String>,
        features: Vec<Vec<f64>>,
    ) -> Result<Self, DatasetError> {
        let dim = features.first().map_or(0, Vec::len);
        let feature_names = (0..dim).map(|i| format!("x{i}")).collect();
        let rows = features
            .into_iter()
            .enumerate()
            .map(|(index, features)| Row { index, features })
            .collect();
        Self::new(name, feature_names, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn dim(&self) -> usize {
        self.feature_names.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Feature matrix with one row per observation, in row order.
    pub fn records(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), self.dim()), |(i, j)| {
            self.rows[i].features[j]
        })
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|r| r.index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
