//! Table layer.
//!
//! [`DeltaTable`] pairs a delta-rs table with the local [`TableLocation`] it
//! was opened from. Log replay, checkpoints, Parquet writes and commits are
//! delta-rs's job; this layer adds what delta-rs does not do:
//!
//! - `write`: Spark-style save mode names and the write outcome.
//! - `scan`: reading the snapshot back through DataFusion.
//! - `properties`: `SET TBLPROPERTIES` with value checks for the flags this
//!   crate acts on.
//! - `schema`: a readable view of the schema recorded in the log.
//!
//! Every commit made through this type runs the post-commit hooks, which
//! currently means regenerating the symlink manifest when the table has
//! `delta.compatibility.symlinkFormatManifest.enabled = true`.

pub mod error;
pub mod properties;
pub mod scan;
pub mod schema;
pub mod write;

pub use error::TableError;
pub use properties::{PropertyChange, TableProperties};
pub use schema::{Column, TableSchema};
pub use write::{SaveMode, WriteOutcome, parse_save_mode};

use std::collections::HashMap;

use deltalake::{ensure_table_uri, kernel::EagerSnapshot};
use log::{debug, info};
use snafu::prelude::*;

use crate::{
    manifest::{self, ManifestMode, ManifestReport},
    storage::TableLocation,
};
use error::{DeltaSnafu, NotATableSnafu};

/// Handle over a committed Delta table.
#[derive(Debug, Clone)]
pub struct DeltaTable {
    location: TableLocation,
    inner: deltalake::DeltaTable,
}

/// Load whatever delta-rs finds at `location`; an empty directory yields an
/// uninitialized table (no version).
pub(crate) async fn load_delta(
    location: &TableLocation,
) -> Result<deltalake::DeltaTable, TableError> {
    let url = ensure_table_uri(location.root().to_string_lossy())
        .context(DeltaSnafu { operation: "resolve location" })?;
    deltalake::DeltaTable::try_from_url(url)
        .await
        .context(DeltaSnafu { operation: "load" })
}

/// `add.path` values are URL-encoded relative paths.
fn decode_add_path(path: &str) -> String {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_owned())
}

impl DeltaTable {
    /// Open the table at `location`, failing with [`TableError::NotATable`]
    /// when no commit exists yet.
    pub async fn open(location: TableLocation) -> Result<Self, TableError> {
        let path = location.root().display().to_string();
        Self::try_open(location)
            .await?
            .context(NotATableSnafu { path })
    }

    /// Open the table at `location`, or `None` when no commit exists yet.
    pub async fn try_open(location: TableLocation) -> Result<Option<Self>, TableError> {
        let inner = load_delta(&location).await?;
        if inner.version().is_none() {
            debug!("no Delta log under {}", location.root().display());
            return Ok(None);
        }
        Ok(Some(Self { location, inner }))
    }

    pub(crate) fn from_parts(location: TableLocation, inner: deltalake::DeltaTable) -> Self {
        Self { location, inner }
    }

    /// Re-read the log so the handle reflects the latest commit.
    pub async fn refresh(&mut self) -> Result<(), TableError> {
        self.inner
            .load()
            .await
            .context(DeltaSnafu { operation: "load" })
    }

    /// Table root.
    pub fn location(&self) -> &TableLocation {
        &self.location
    }

    /// The delta-rs table behind this handle.
    pub fn as_delta(&self) -> &deltalake::DeltaTable {
        &self.inner
    }

    /// Latest committed version seen by this handle.
    pub fn version(&self) -> i64 {
        // An open handle always has at least version 0.
        self.inner.version().unwrap_or(-1)
    }

    fn snapshot(&self) -> Result<&EagerSnapshot, TableError> {
        let state = self
            .inner
            .snapshot()
            .context(DeltaSnafu { operation: "snapshot" })?;
        Ok(state.snapshot())
    }

    /// Raw `metaData.configuration` of the current snapshot.
    pub fn configuration(&self) -> Result<HashMap<String, String>, TableError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .metadata()
            .configuration()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    /// Typed table properties.
    pub fn properties(&self) -> Result<TableProperties, TableError> {
        Ok(TableProperties::from_configuration(&self.configuration()?))
    }

    /// Columns of the table schema.
    pub fn schema(&self) -> Result<TableSchema, TableError> {
        let schema = self
            .snapshot()?
            .metadata()
            .parse_schema()
            .map_err(|err| TableError::Schema {
                message: err.to_string(),
            })?;
        let value = serde_json::to_value(&schema).map_err(|err| TableError::Schema {
            message: err.to_string(),
        })?;
        TableSchema::from_json(value).map_err(|err| TableError::Schema {
            message: err.to_string(),
        })
    }

    /// Live data files relative to the table root, sorted.
    pub fn data_files(&self) -> Result<Vec<String>, TableError> {
        // `LogicalFileView::path` already percent-decodes the raw log path.
        let mut paths: Vec<String> = self
            .snapshot()?
            .log_data()
            .iter()
            .map(|file| file.path().into_owned())
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Generate a compatibility manifest of the given kind for the current
    /// snapshot. Only `symlink_format_manifest` is supported.
    pub async fn generate(&self, mode: &str) -> Result<ManifestReport, TableError> {
        let mode: ManifestMode = mode.parse()?;
        match mode {
            ManifestMode::SymlinkFormat => {
                manifest::generate_symlink_manifest(
                    &self.location,
                    self.version(),
                    &self.data_files()?,
                )
                .await
            }
        }
    }

    /// Hooks that run after every commit made through this crate.
    ///
    /// Returns the regenerated manifest, if the table asked for one.
    pub(crate) async fn run_post_commit_hooks(
        &self,
    ) -> Result<Option<ManifestReport>, TableError> {
        if !self.properties()?.symlink_manifest_enabled {
            return Ok(None);
        }

        let report = manifest::generate_symlink_manifest(
            &self.location,
            self.version(),
            &self.data_files()?,
        )
        .await?;
        info!(
            "regenerated symlink manifest for version {} ({} files)",
            report.version,
            report.data_files.len()
        );
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn add_paths_are_url_decoded() {
        assert_eq!(decode_add_path("part-0.snappy.parquet"), "part-0.snappy.parquet");
        assert_eq!(decode_add_path("a%20b/part-0.parquet"), "a b/part-0.parquet");
    }

    #[tokio::test]
    async fn open_empty_directory_is_not_a_table() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        assert!(DeltaTable::try_open(location.clone()).await?.is_none());
        let err = DeltaTable::open(location).await.expect_err("no commits");
        assert!(matches!(err, TableError::NotATable { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn generate_rejects_other_modes() -> TestResult {
        let tmp = TempDir::new()?;
        let (table, _) = DeltaTable::write(
            TableLocation::local(tmp.path()),
            vec![crate::fixture::sample_batch()?],
            SaveMode::Overwrite,
        )
        .await?;

        let err = table.generate("hive_manifest").await.expect_err("unsupported");
        assert!(matches!(err, TableError::UnsupportedManifestMode { .. }));
        assert!(!tmp.path().join("_symlink_format_manifest").exists());
        Ok(())
    }
}
