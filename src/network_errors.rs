use arrow_schema::{ArrowError, DataType};
use camino::Utf8PathBuf;
use parquet::errors::ParquetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),

    #[error("Field not found: {0}")]
    MissingField(String),

    #[error("Unsupported column type for field '{field}': {data_type}")]
    UnsupportedColumnType { field: String, data_type: DataType },

    #[error("Column type of field '{field}' does not match the model dataset")]
    ColumnTypeMismatch { field: String },

    #[error("Field '{field}' holds {found} values, {expected} were expected")]
    ColumnLengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("File {file} holds {found} observations, {expected} were expected")]
    ObservationCountMismatch {
        file: Utf8PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Input files hold {found} observations, the group array holds {expected}")]
    TotalCountMismatch { expected: usize, found: usize },

    #[error("Split index holds {found} rows, the dataset holds {expected}")]
    SplitLengthMismatch { expected: usize, found: usize },

    #[error("Row {row} at position {position} of the index order is repeated or out of range")]
    InvalidIndexOrder { position: usize, row: usize },

    #[error("Link value {value} at row {row} is outside the dataset")]
    InvalidLink { row: usize, value: i32 },

    #[error("Invalid network parameter: {0}")]
    InvalidParameter(String),

    #[error("No input file to group")]
    EmptyFileList,
}

impl PartialEq for NetworkError {
    fn eq(&self, other: &Self) -> bool {
        use NetworkError::*;
        match (self, other) {
            // not comparable: equal when same variant
            (IoError(_), IoError(_)) => true,
            (ParquetError(_), ParquetError(_)) => true,
            (ArrowError(_), ArrowError(_)) => true,

            (MissingField(a), MissingField(b)) => a == b,
            (
                UnsupportedColumnType {
                    field: a,
                    data_type: ta,
                },
                UnsupportedColumnType {
                    field: b,
                    data_type: tb,
                },
            ) => a == b && ta == tb,
            (ColumnTypeMismatch { field: a }, ColumnTypeMismatch { field: b }) => a == b,
            (
                ColumnLengthMismatch {
                    field: fa,
                    expected: ea,
                    found: na,
                },
                ColumnLengthMismatch {
                    field: fb,
                    expected: eb,
                    found: nb,
                },
            ) => fa == fb && ea == eb && na == nb,
            (InvalidMetadata(a), InvalidMetadata(b)) => a == b,
            (
                ObservationCountMismatch {
                    file: fa,
                    expected: ea,
                    found: na,
                },
                ObservationCountMismatch {
                    file: fb,
                    expected: eb,
                    found: nb,
                },
            ) => fa == fb && ea == eb && na == nb,
            (
                TotalCountMismatch {
                    expected: ea,
                    found: na,
                },
                TotalCountMismatch {
                    expected: eb,
                    found: nb,
                },
            ) => ea == eb && na == nb,
            (
                SplitLengthMismatch {
                    expected: ea,
                    found: na,
                },
                SplitLengthMismatch {
                    expected: eb,
                    found: nb,
                },
            ) => ea == eb && na == nb,
            (
                InvalidIndexOrder {
                    position: pa,
                    row: ra,
                },
                InvalidIndexOrder {
                    position: pb,
                    row: rb,
                },
            ) => pa == pb && ra == rb,
            (InvalidLink { row: ra, value: va }, InvalidLink { row: rb, value: vb }) => {
                ra == rb && va == vb
            }
            (InvalidParameter(a), InvalidParameter(b)) => a == b,

            (EmptyFileList, EmptyFileList) => true,

            _ => false,
        }
    }
}
