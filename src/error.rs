//! Error types for table loading, mutation and filtering.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::{ColumnKind, Family};

/// Errors surfaced by [`Table`](crate::Table) and [`Selection`](crate::Selection).
///
/// A cell that is simply absent is not an error: cell lookups return
/// `Ok(None)` for that case.
#[derive(Error, Debug)]
pub enum StoreError {
    /// On-disk header does not equal the declared schema header.
    #[error("{}: header {found:?} does not match schema {expected:?}", .path.display())]
    BadHeader {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The sniffer could not settle on a delimiter from the leading sample.
    #[error("{}: could not detect a delimiter from the leading sample", .path.display())]
    DialectUndetected { path: PathBuf },

    /// A row index beyond the current row count.
    #[error("row {index} out of range (table has {len} rows)")]
    OutOfRange { index: usize, len: usize },

    /// A row handed to the table has the wrong number of fields.
    #[error("row has {found} fields, schema has {expected}")]
    RowWidth { expected: usize, found: usize },

    /// A data line in the file has the wrong number of fields.
    #[error("{}: line {line} has {found} fields, schema has {expected}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Cell access or save on a table that was never bound to a file.
    #[error("table is not bound to a file")]
    Unbound,

    /// A cell could not be coerced to its column's declared kind.
    #[error("row {row}, column {column}: {value:?} is not a valid {kind}")]
    InvalidValue {
        row: usize,
        column: usize,
        kind: ColumnKind,
        value: String,
    },

    /// Range filters need an ordered column kind.
    #[error("column {column} holds text and has no ordering for range filters")]
    UnorderedColumn { column: usize },

    /// A filter addressed a column the schema does not declare.
    #[error("column {column} is outside the schema ({width} columns)")]
    NoSuchColumn { column: usize, width: usize },

    /// A filter argument that does not fit the column's kind.
    #[error("column {column}: {value:?} cannot be compared with a {kind} column")]
    BadArgument {
        column: usize,
        kind: ColumnKind,
        value: String,
    },

    /// A family helper was used on a table of another record family.
    #[error("{filter} does not apply to {found} tables")]
    WrongFamily { filter: &'static str, found: Family },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.into(),
            source,
        }
    }

    /// `true` for load errors caused by the file's content (schema mismatch,
    /// undetectable dialect, malformed row). Nothing is cached on failure, so
    /// every later read retries the load and fails again until the file is
    /// fixed or the table is bound elsewhere.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::BadHeader { .. }
                | StoreError::DialectUndetected { .. }
                | StoreError::MalformedRow { .. }
        )
    }
}
