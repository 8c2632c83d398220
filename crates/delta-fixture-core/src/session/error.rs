//! Errors raised by the session API.
use snafu::prelude::*;

use crate::{storage::StorageError, table::TableError};

/// Errors from session setup, `DataFrame` writes and SQL statements.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    /// The session was built without the Delta extension or catalog.
    #[snafu(display(
        "Delta support is not enabled: set {key} to include {expected} (found {found:?})"
    ))]
    FormatNotEnabled {
        /// The configuration key that is missing or wrong.
        key: String,
        /// The value Delta support requires.
        expected: String,
        /// The configured value, if any.
        found: Option<String>,
    },

    /// A `DataFrameWriter` was asked for a format other than `delta`.
    #[snafu(display("Unsupported data source format {format:?}; only 'delta' is supported"))]
    UnsupportedFormat {
        /// The requested format.
        format: String,
    },

    /// The SQL text could not be tokenized or parsed.
    #[snafu(display("Syntax error in SQL statement at position {position}: {msg}"))]
    SqlParse {
        /// Byte offset in the statement where parsing failed.
        position: usize,
        /// What was expected or found.
        msg: String,
    },

    /// The statement parsed but is not one this engine executes.
    #[snafu(display("Unsupported SQL statement: {statement}"))]
    UnsupportedStatement {
        /// The leading keywords of the statement.
        statement: String,
    },

    /// The table location string could not be interpreted.
    #[snafu(display("Invalid table location: {source}"))]
    Location {
        /// Underlying storage error.
        source: StorageError,
    },

    /// A table operation failed.
    #[snafu(display("{source}"))]
    Table {
        /// Underlying table error.
        #[snafu(source(from(TableError, Box::new)))]
        source: Box<TableError>,
    },
}
