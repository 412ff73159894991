//! Minimal numeric CSV reader.
//!
//! The first non-blank line is the header. Every other non-blank line is one
//! row. Fields are split on the delimiter and trimmed; quoting is not
//! supported because every kept column must parse as a number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{Dataset, DatasetError, Row};

/// Column roles for [`Dataset::from_reader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: char,
    /// Column holding the ground-truth class. Excluded from the features.
    pub target: Option<String>,
    /// Column holding the row index. Rows are numbered by position when unset.
    pub index_column: Option<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            target: None,
            index_column: None,
        }
    }
}

impl CsvOptions {
    pub fn with_target(mut self, column: impl Into<String>) -> Self {
        self.target = Some(column.into());
        self
    }

    pub fn with_index_column(mut self, column: impl Into<String>) -> Self {
        self.index_column = Some(column.into());
        self
    }
}

impl Dataset {
    /// Loads a CSV file. The dataset is named after the file stem.
    pub fn from_csv_path(path: impl AsRef<Path>, opts: &CsvOptions) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        let file = File::open(path)?;
        let dataset = Self::from_reader(name, BufReader::new(file), opts)?;
        tracing::debug!(
            path = %path.display(),
            rows = dataset.len(),
            dim = dataset.dim(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader(
        name: impl Into<String>,
        reader: impl BufRead,
        opts: &CsvOptions,
    ) -> Result<Self, DatasetError> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|l| (i + 1, l)))
            .filter(|res| res.as_ref().map_or(true, |(_, l)| !l.trim().is_empty()));

        let header: Vec<String> = match lines.next() {
            Some(res) => {
                let (_, line) = res?;
                split(&line, opts.delimiter).map(str::to_string).collect()
            }
            None => return Err(DatasetError::MissingHeader),
        };

        let column_of = |column: &Option<String>| -> Result<Option<usize>, DatasetError> {
            match column {
                Some(c) => header
                    .iter()
                    .position(|h| h == c)
                    .map(Some)
                    .ok_or_else(|| DatasetError::UnknownColumn(c.clone())),
                None => Ok(None),
            }
        };
        let target = column_of(&opts.target)?;
        let index_col = column_of(&opts.index_column)?;

        let feature_cols: Vec<usize> = (0..header.len())
            .filter(|&c| Some(c) != target && Some(c) != index_col)
            .collect();
        let feature_names = feature_cols.iter().map(|&c| header[c].clone()).collect();

        let mut rows = Vec::new();
        for (position, res) in lines.enumerate() {
            let (line_no, line) = res?;
            let fields: Vec<&str> = split(&line, opts.delimiter).collect();
            if fields.len() != header.len() {
                return Err(DatasetError::FieldCount {
                    line: line_no,
                    expected: header.len(),
                    got: fields.len(),
                });
            }

            let index = match index_col {
                Some(c) => fields[c].parse::<usize>().map_err(|_| DatasetError::Parse {
                    line: line_no,
                    column: header[c].clone(),
                    value: fields[c].to_string(),
                })?,
                None => position,
            };

            let features = feature_cols
                .iter()
                .map(|&c| {
                    fields[c].parse::<f64>().map_err(|_| DatasetError::Parse {
                        line: line_no,
                        column: header[c].clone(),
                        value: fields[c].to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            rows.push(Row { index, features });
        }

        Self::new(name, feature_names, rows)
    }
}

fn split(line: &str, delimiter: char) -> impl Iterator<Item = &str> {
    line.split(delimiter).map(str::trim)
}
