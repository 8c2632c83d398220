//! Error types and SNAFU context selectors for the table layer.
//!
//! `TableError` wraps the delta-rs and DataFusion failures behind the write,
//! scan and property operations, and adds the checks this crate makes on
//! top of them (manifest mode, save mode, property values).

use deltalake::{datafusion::error::DataFusionError, errors::DeltaTableError};
use snafu::prelude::*;

use crate::{storage::StorageError, table::properties::PropertyError};

/// Errors from high-level table operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    /// delta-rs failed to load, write or commit to the table.
    #[snafu(display("Delta table operation '{operation}' failed: {source}"))]
    Delta {
        /// What was being done (`load`, `write`, `set properties`, ...).
        operation: &'static str,
        /// Underlying delta-rs error.
        source: DeltaTableError,
    },

    /// The path has no committed snapshot.
    #[snafu(display("{path} is not a Delta table (no commits under _delta_log)"))]
    NotATable {
        /// Table root that was opened.
        path: String,
    },

    /// A write with `SaveMode::ErrorIfExists` found an existing table.
    #[snafu(display("Table at {path} already exists (version {version})"))]
    TableAlreadyExists {
        /// Table root.
        path: String,
        /// Latest committed version.
        version: i64,
    },

    /// Reading the table through DataFusion failed.
    #[snafu(display("Scan of {path} failed: {source}"))]
    Scan {
        /// Table root.
        path: String,
        /// Underlying DataFusion error.
        source: DataFusionError,
    },

    /// Storage error while writing or reading the manifest.
    #[snafu(display("Storage error while accessing table files: {source}"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },

    /// The schema recorded in the table metadata could not be read.
    #[snafu(display("Cannot read the table schema: {message}"))]
    Schema {
        /// What went wrong.
        message: String,
    },

    /// An invalid value for a table property this crate acts on.
    #[snafu(display("Invalid table property: {source}"))]
    Property {
        /// Underlying validation error.
        source: PropertyError,
    },

    /// The requested manifest kind is not supported.
    #[snafu(display(
        "Unsupported manifest mode {mode:?}; only 'symlink_format_manifest' is supported"
    ))]
    UnsupportedManifestMode {
        /// The mode string supplied by the caller.
        mode: String,
    },

    /// The requested save mode is not known.
    #[snafu(display(
        "Unknown save mode {mode:?}; accepted: append, overwrite, error, errorifexists, ignore"
    ))]
    InvalidSaveMode {
        /// The mode string supplied by the caller.
        mode: String,
    },
}
