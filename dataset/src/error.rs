use thiserror::Error;

/// Errors returned while building or loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset: io: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset: no header row")]
    MissingHeader,

    #[error("dataset: column {0:?} not found in header")]
    UnknownColumn(String),

    #[error("dataset: line {line}: expected {expected} fields, got {got}")]
    FieldCount {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("dataset: line {line}: column {column:?}: {value:?} is not a number")]
    Parse {
        line: usize,
        column: String,
        value: String,
    },

    #[error("dataset: row {index} has {got} features, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("dataset: duplicate row index {0}")]
    DuplicateIndex(usize),
}
