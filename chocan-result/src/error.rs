use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for all record store operations.
///
/// Errors are raised synchronously to the immediate caller. The store never
/// retries and never partially recovers: a validation failure leaves the table
/// file untouched, and an I/O failure is reported as-is.
#[derive(Error, Debug)]
pub enum Error {
    /// A table or report file could not be read, decoded or written.
    ///
    /// Covers permission problems, missing directories, disk errors and files
    /// that exist but are not valid Parquet.
    #[error("storage error at '{}': {message}", path.display())]
    StorageIo { path: PathBuf, message: String },

    /// A set of column names disagrees with a table's declared columns.
    ///
    /// Raised on the read path when a stored file was written with another
    /// layout, and on the write path when supplied rows carry missing or extra
    /// columns. The comparison is an exact set match.
    #[error("column mismatch for table '{table}': expected {expected:?}, found {found:?}")]
    ColumnMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A referenced column does not exist in the table.
    #[error("column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// A value cannot be represented as its column's declared type.
    #[error("value {value} has the wrong type for column '{column}' (expected {expected})")]
    TypeMismatch {
        column: String,
        expected: String,
        value: String,
    },

    /// A value's character length or numeric magnitude is outside its limit.
    #[error("value {value} for column '{column}' is outside {limit}")]
    RangeError {
        column: String,
        value: String,
        limit: String,
    },

    /// A filter value cannot be compared against a column with the requested operator.
    #[error("cannot apply '{op}' to column '{column}' with value {value}")]
    UnsupportedComparison {
        column: String,
        op: String,
        value: String,
    },

    /// Index column values would no longer be unique.
    #[error("duplicate index values in table '{table}': {keys:?}")]
    DuplicateKey { table: String, keys: Vec<String> },

    /// No row's index column holds the requested value.
    #[error("index {index} not found in table '{table}'")]
    IndexNotFound { table: String, index: String },

    /// Invalid caller input, such as an update with no field changes.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Arrow compute or array construction failure.
    ///
    /// Validation runs before any Arrow kernel sees the data, so this variant
    /// normally signals a bug rather than bad input.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Internal error indicating a bug or unexpected state.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap any displayable failure as a [`Error::StorageIo`] for `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chocan_result::Error;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    /// let err = Error::storage_io("storage/members.pkt", io_err);
    /// assert!(matches!(err, Error::StorageIo { ref message, .. } if message.contains("denied")));
    /// ```
    #[inline]
    pub fn storage_io<P: AsRef<Path>, E: fmt::Display>(path: P, err: E) -> Self {
        Error::StorageIo {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Build a [`Error::ColumnMismatch`] from two column name lists.
    pub fn column_mismatch<E, F>(table: &str, expected: E, found: F) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Error::ColumnMismatch {
            table: table.to_string(),
            expected: expected.into_iter().map(Into::into).collect(),
            found: found.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn unknown_column(table: &str, column: &str) -> Self {
        Error::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_column() {
        let err = Error::unknown_column("members", "nickname");
        assert_eq!(
            err.to_string(),
            "column 'nickname' does not exist in table 'members'"
        );

        let err = Error::RangeError {
            column: "price_cents".into(),
            value: "100".into(),
            limit: "numeric limit [0, 99]".into(),
        };
        assert!(err.to_string().contains("price_cents"));
        assert!(err.to_string().contains("[0, 99]"));
    }

    #[test]
    fn column_mismatch_collects_names() {
        let err = Error::column_mismatch("test", ["ID", "value"], vec!["ID".to_string()]);
        match err {
            Error::ColumnMismatch {
                table,
                expected,
                found,
            } => {
                assert_eq!(table, "test");
                assert_eq!(expected, vec!["ID", "value"]);
                assert_eq!(found, vec!["ID"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn arrow_errors_convert() {
        let arrow_err = arrow::error::ArrowError::ComputeError("boom".into());
        let err: Error = arrow_err.into();
        assert!(matches!(err, Error::Arrow(_)));
    }
}
