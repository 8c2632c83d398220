use delta_fixture_core::{arrow::error::ArrowError, session::SessionError, table::TableError};

use snafu::Snafu;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Failed to start a Delta-enabled session: {source}"))]
    StartSession {
        #[snafu(source(from(SessionError, Box::new)))]
        source: Box<SessionError>,
    },

    #[snafu(display("Failed to build the sample records: {source}"))]
    SampleData { source: ArrowError },

    #[snafu(display(
        "Failed to write Delta table at {table}. \
         Ensure the directory is writable: {source}"
    ))]
    WriteTable {
        table: String,
        #[snafu(source(from(SessionError, Box::new)))]
        source: Box<SessionError>,
    },

    #[snafu(display("Failed to open Delta table at {table}: {source}"))]
    OpenTable {
        table: String,
        #[snafu(source(from(SessionError, Box::new)))]
        source: Box<SessionError>,
    },

    #[snafu(display("Failed to generate symlink manifest for {table}: {source}"))]
    GenerateManifest {
        table: String,
        #[snafu(source(from(TableError, Box::new)))]
        source: Box<TableError>,
    },

    #[snafu(display("Failed to enable automatic manifest generation for {table}: {source}"))]
    EnableManifest {
        table: String,
        #[snafu(source(from(SessionError, Box::new)))]
        source: Box<SessionError>,
    },
}
