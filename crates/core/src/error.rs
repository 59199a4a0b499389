use thiserror::Error;

/// Failure to build a grid from a layout or from board dimensions.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("malformed board header {0:?}, expected \"WIDTH HEIGHT\"")]
    MalformedHeader(String),
    #[error("board must have at least one row and one column")]
    EmptyBoard,
    #[error("expected {expected} rows but found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row}: expected {expected} columns but found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}, column {column}: expected 0 or 1 but found {token:?}")]
    InvalidToken {
        row: usize,
        column: usize,
        token: String,
    },
    #[error("failed to read board file")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;
