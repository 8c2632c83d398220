use std::io;

use snafu::{Backtrace, prelude::*};

/// Failures of the local file helpers in [`crate::storage`].
///
/// Every variant names the path it was working on; the OS error is kept as
/// the source so callers can still inspect its kind.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// Nothing exists at the path.
    #[snafu(display("No such file: {path}"))]
    NotFound {
        /// Path that was looked up.
        path: String,
        /// OS error reported for the lookup.
        source: io::Error,
        /// Where the lookup failed.
        backtrace: Backtrace,
    },

    /// Any other filesystem failure (permissions, a directory in the way,
    /// a full disk, ...).
    #[snafu(display("I/O failure on {path}: {source}"))]
    Io {
        /// Path being read or written.
        path: String,
        /// OS error.
        source: io::Error,
        /// Where the operation failed.
        backtrace: Backtrace,
    },

    /// The location is not a local directory.
    #[snafu(display("Cannot use {location:?} as a table location: {reason}"))]
    UnsupportedLocation {
        /// Location string as given.
        location: String,
        /// Why it was refused.
        reason: String,
        /// Where it was refused.
        backtrace: Backtrace,
    },
}
