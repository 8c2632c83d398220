//! Session facade over the Delta engine.
//!
//! The session mirrors the shape of a Spark session with the Delta extension
//! installed: a builder that takes string options, DataFrames written through
//! `df.write().format("delta").mode(..).save(path)`, path-based table handles
//! and a small SQL surface. Delta support must be switched on through the
//! builder options (or [`SessionBuilder::configure_delta`]); a session built
//! without them refuses to start.
//!
//! ```no_run
//! # async fn demo(batch: deltalake::arrow::array::RecordBatch) -> Result<(), delta_fixture_core::session::SessionError> {
//! use delta_fixture_core::session::Session;
//!
//! let session = Session::builder()
//!     .app_name("example")
//!     .configure_delta()
//!     .get_or_create()?;
//!
//! let df = session.create_dataframe(batch);
//! df.write().format("delta").mode("overwrite").save("/tmp/t").await?;
//! session.sql("ALTER TABLE delta.`/tmp/t` SET TBLPROPERTIES (owner = 'me')").await?;
//! session.stop();
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod sql;

pub use error::SessionError;
pub use sql::{Statement, delta_table_reference, parse_statement};

use std::collections::BTreeMap;

use deltalake::arrow::array::RecordBatch;
use log::{debug, info};
use snafu::prelude::*;

use crate::{
    manifest::ManifestReport,
    storage::TableLocation,
    table::{DeltaTable, WriteOutcome, parse_save_mode, properties::PropertyChange},
};
use error::{FormatNotEnabledSnafu, LocationSnafu, TableSnafu, UnsupportedFormatSnafu};

/// Option listing the SQL extensions to install (comma-separated).
pub const SQL_EXTENSIONS_KEY: &str = "spark.sql.extensions";
/// Option naming the session catalog implementation.
pub const SESSION_CATALOG_KEY: &str = "spark.sql.catalog.spark_catalog";
/// Extension that enables Delta SQL statements.
pub const DELTA_SQL_EXTENSION: &str = "io.delta.sql.DeltaSparkSessionExtension";
/// Catalog that resolves `delta.`<path>`` tables.
pub const DELTA_CATALOG: &str = "org.apache.spark.sql.delta.catalog.DeltaCatalog";

/// The only data source format this engine writes.
pub const DELTA_FORMAT: &str = "delta";

const DEFAULT_APP_NAME: &str = "delta-fixture";
/// Spark writes fail on an existing table unless told otherwise.
const DEFAULT_SAVE_MODE: &str = "errorifexists";

/// Builder for [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    app_name: Option<String>,
    options: BTreeMap<String, String>,
}

impl SessionBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name reported in logs.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Set one option; later calls for the same key win.
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Fill in the Delta extension and catalog options the caller left unset.
    pub fn configure_delta(mut self) -> Self {
        self.options
            .entry(SQL_EXTENSIONS_KEY.to_string())
            .or_insert_with(|| DELTA_SQL_EXTENSION.to_string());
        self.options
            .entry(SESSION_CATALOG_KEY.to_string())
            .or_insert_with(|| DELTA_CATALOG.to_string());
        self
    }

    /// Validate the options and start the session.
    pub fn get_or_create(self) -> Result<Session, SessionError> {
        let extensions = self.options.get(SQL_EXTENSIONS_KEY);
        let has_extension = extensions.is_some_and(|list| {
            list.split(',').any(|ext| ext.trim() == DELTA_SQL_EXTENSION)
        });
        ensure!(
            has_extension,
            FormatNotEnabledSnafu {
                key: SQL_EXTENSIONS_KEY,
                expected: DELTA_SQL_EXTENSION,
                found: extensions.cloned(),
            }
        );

        let catalog = self.options.get(SESSION_CATALOG_KEY);
        ensure!(
            catalog.is_some_and(|c| c.trim() == DELTA_CATALOG),
            FormatNotEnabledSnafu {
                key: SESSION_CATALOG_KEY,
                expected: DELTA_CATALOG,
                found: catalog.cloned(),
            }
        );

        let app_name = self
            .app_name
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        info!("started session {app_name}");
        Ok(Session {
            app_name,
            options: self.options,
            active: true,
        })
    }
}

/// A running session with Delta support.
#[derive(Debug)]
pub struct Session {
    app_name: String,
    options: BTreeMap<String, String>,
    active: bool,
}

/// What a SQL statement did.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlOutcome {
    /// `SET TBLPROPERTIES` committed.
    PropertiesSet(PropertyChange),
    /// `GENERATE` wrote a manifest.
    ManifestGenerated(ManifestReport),
}

fn table_location(path: &str) -> Result<TableLocation, SessionError> {
    TableLocation::parse(path).context(LocationSnafu)
}

impl Session {
    /// Start building a session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Name given at build time.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Value of a session option.
    pub fn conf(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Wrap one batch as a DataFrame.
    pub fn create_dataframe(&self, batch: RecordBatch) -> DataFrame {
        DataFrame {
            batches: vec![batch],
        }
    }

    /// Execute one SQL statement.
    pub async fn sql(&self, statement: &str) -> Result<SqlOutcome, SessionError> {
        debug!("[{}] executing SQL: {statement}", self.app_name);
        match sql::parse_statement(statement)? {
            Statement::SetTblProperties { table, properties } => {
                let mut table = DeltaTable::for_path(self, &table).await?;
                let change = table
                    .set_properties(&properties)
                    .await
                    .context(TableSnafu)?;
                Ok(SqlOutcome::PropertiesSet(change))
            }
            Statement::Generate { mode, table } => {
                let table = DeltaTable::for_path(self, &table).await?;
                let report = table.generate(&mode).await.context(TableSnafu)?;
                Ok(SqlOutcome::ManifestGenerated(report))
            }
        }
    }

    /// Shut the session down.
    pub fn stop(mut self) {
        self.active = false;
        info!("stopped session {}", self.app_name);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.active {
            debug!("releasing session {} that was not stopped", self.app_name);
        }
    }
}

impl DeltaTable {
    /// Open the Delta table at `path` through `session`.
    ///
    /// Fails with `TableError::NotATable` when the path has no commits.
    pub async fn for_path(_session: &Session, path: &str) -> Result<DeltaTable, SessionError> {
        let location = table_location(path)?;
        DeltaTable::open(location).await.context(TableSnafu)
    }
}

/// In-memory rows ready to be written.
#[derive(Debug, Clone)]
pub struct DataFrame {
    batches: Vec<RecordBatch>,
}

impl DataFrame {
    /// Start describing a write of these rows.
    pub fn write(&self) -> DataFrameWriter<'_> {
        DataFrameWriter {
            df: self,
            format: None,
            mode: DEFAULT_SAVE_MODE.to_string(),
        }
    }
}

/// Builder-style description of a DataFrame write.
#[derive(Debug)]
pub struct DataFrameWriter<'a> {
    df: &'a DataFrame,
    format: Option<String>,
    mode: String,
}

impl DataFrameWriter<'_> {
    /// Data source format; only `delta` is accepted by [`save`](Self::save).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Save mode by name (`append`, `overwrite`, `error`, `errorifexists`,
    /// `ignore`); validated by [`save`](Self::save).
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Write the rows to the table at `path`.
    pub async fn save(self, path: &str) -> Result<WriteOutcome, SessionError> {
        // Spark's default data source is Parquet.
        let format = self.format.unwrap_or_else(|| "parquet".to_string());
        ensure!(
            format.trim().eq_ignore_ascii_case(DELTA_FORMAT),
            UnsupportedFormatSnafu { format }
        );

        let mode = parse_save_mode(&self.mode).context(TableSnafu)?;
        let location = table_location(path)?;
        let (_, outcome) = DeltaTable::write(location, self.df.batches.clone(), mode)
            .await
            .context(TableSnafu)?;
        Ok(outcome)
    }
}
