//! Write pipeline for `DeltaTable`.
//!
//! delta-rs encodes the batches as Parquet, plans the `add`/`remove`
//! actions for the save mode and commits. This module maps Spark-style save
//! mode names onto it, reports what the commit did and runs the post-commit
//! hooks. Overwrite only stops referencing the old files; they stay on disk
//! until a vacuum.

use deltalake::arrow::array::RecordBatch;
use log::{info, warn};
use serde_json::Value;
use snafu::prelude::*;

pub use deltalake::protocol::SaveMode;

use crate::{
    manifest::ManifestReport,
    storage::TableLocation,
    table::{
        DeltaTable,
        error::{DeltaSnafu, InvalidSaveModeSnafu, TableAlreadyExistsSnafu, TableError},
        load_delta,
    },
};

/// Parse a save mode name as accepted by Spark's `DataFrameWriter.mode`.
///
/// Case-insensitive; `error`, `errorifexists` and `default` all mean
/// [`SaveMode::ErrorIfExists`].
pub fn parse_save_mode(mode: &str) -> Result<SaveMode, TableError> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "append" => Ok(SaveMode::Append),
        "overwrite" => Ok(SaveMode::Overwrite),
        "error" | "errorifexists" | "default" => Ok(SaveMode::ErrorIfExists),
        "ignore" => Ok(SaveMode::Ignore),
        _ => InvalidSaveModeSnafu { mode }.fail(),
    }
}

/// Summary of one write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// Table version after the write.
    pub version: i64,
    /// False when `SaveMode::Ignore` found an existing table.
    pub committed: bool,
    /// Rows handed to the commit (0 when nothing was committed).
    pub rows_written: usize,
    /// `operationMetrics` recorded in the commit, or `null`.
    pub metrics: Value,
    /// Manifest regenerated by the post-commit hook, if any.
    pub manifest: Option<ManifestReport>,
}

impl DeltaTable {
    /// Write `batches` to the table at `location` with the given save mode,
    /// creating the table on first write.
    ///
    /// Returns the refreshed table handle alongside the outcome.
    pub async fn write(
        location: TableLocation,
        batches: Vec<RecordBatch>,
        mode: SaveMode,
    ) -> Result<(DeltaTable, WriteOutcome), TableError> {
        let existing = load_delta(&location).await?;
        let before = existing.version();

        if let (Some(version), SaveMode::ErrorIfExists) = (before, &mode) {
            return TableAlreadyExistsSnafu {
                path: location.root().display().to_string(),
                version,
            }
            .fail();
        }

        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        let written = existing
            .write(batches)
            .with_save_mode(mode)
            .await
            .context(DeltaSnafu { operation: "write" })?;

        let committed = written.version() != before;
        let table = DeltaTable::from_parts(location, written);

        let (metrics, manifest) = if committed {
            let metrics = table.latest_operation_metrics().await;
            (metrics, table.run_post_commit_hooks().await?)
        } else {
            info!(
                "table at {} already exists; write skipped",
                table.location().root().display()
            );
            (Value::Null, None)
        };

        let outcome = WriteOutcome {
            version: table.version(),
            committed,
            rows_written: if committed { rows } else { 0 },
            metrics,
            manifest,
        };
        if committed {
            info!(
                "wrote {} rows to {} as version {}",
                outcome.rows_written,
                table.location().root().display(),
                outcome.version
            );
        }
        Ok((table, outcome))
    }

    /// `operationMetrics` of the latest commit; `null` when unavailable.
    async fn latest_operation_metrics(&self) -> Value {
        let mut history = match self.inner.history(Some(1)).await {
            Ok(history) => history,
            Err(err) => {
                warn!("could not read Delta history for metrics: {err}");
                return Value::Null;
            }
        };
        history
            .next()
            .and_then(|commit| commit.info.get("operationMetrics").cloned())
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use deltalake::arrow::{
        array::Int64Array,
        datatypes::{DataType, Field, Schema},
    };
    use tempfile::TempDir;

    use super::*;
    use crate::table::properties::SYMLINK_MANIFEST_ENABLED;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn ids(values: &[i64]) -> Result<RecordBatch, deltalake::arrow::error::ArrowError> {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, true)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values.to_vec()))])
    }

    fn names(values: &[&str]) -> Result<RecordBatch, deltalake::arrow::error::ArrowError> {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "name",
            DataType::Utf8,
            true,
        )]));
        RecordBatch::try_new(
            schema,
            vec![Arc::new(deltalake::arrow::array::StringArray::from(
                values.to_vec(),
            ))],
        )
    }

    #[test]
    fn save_mode_names_parse_case_insensitively() -> Result<(), TableError> {
        assert!(matches!(parse_save_mode("Overwrite")?, SaveMode::Overwrite));
        assert!(matches!(parse_save_mode(" APPEND ")?, SaveMode::Append));
        assert!(matches!(parse_save_mode("errorIfExists")?, SaveMode::ErrorIfExists));
        assert!(matches!(parse_save_mode("error")?, SaveMode::ErrorIfExists));
        assert!(matches!(parse_save_mode("ignore")?, SaveMode::Ignore));

        let err = parse_save_mode("merge").expect_err("unknown mode");
        assert!(matches!(err, TableError::InvalidSaveMode { mode } if mode == "merge"));
        Ok(())
    }

    #[tokio::test]
    async fn overwrite_replaces_live_rows() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        let (_, first) =
            DeltaTable::write(location.clone(), vec![ids(&[1, 2, 3])?], SaveMode::Overwrite)
                .await?;
        assert_eq!(first.version, 0);
        assert!(first.committed);
        assert_eq!(first.rows_written, 3);
        assert!(first.manifest.is_none());

        let (table, second) =
            DeltaTable::write(location, vec![ids(&[7, 8, 9])?], SaveMode::Overwrite).await?;
        assert_eq!(second.version, 1);
        assert_eq!(table.count_rows().await?, 3);
        assert_eq!(table.data_files()?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn append_adds_files() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        DeltaTable::write(location.clone(), vec![ids(&[1])?], SaveMode::Append).await?;
        let (table, outcome) =
            DeltaTable::write(location, vec![ids(&[2, 3])?], SaveMode::Append).await?;

        assert_eq!(outcome.version, 1);
        assert_eq!(table.count_rows().await?, 3);
        assert_eq!(table.data_files()?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn error_if_exists_and_ignore_respect_existing_table() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        let (_, created) =
            DeltaTable::write(location.clone(), vec![ids(&[1])?], SaveMode::ErrorIfExists)
                .await?;
        assert_eq!(created.version, 0);

        let err = DeltaTable::write(location.clone(), vec![ids(&[2])?], SaveMode::ErrorIfExists)
            .await
            .expect_err("table exists");
        assert!(matches!(err, TableError::TableAlreadyExists { version: 0, .. }));

        let (table, ignored) =
            DeltaTable::write(location, vec![ids(&[3])?], SaveMode::Ignore).await?;
        assert!(!ignored.committed);
        assert_eq!(ignored.rows_written, 0);
        assert_eq!(ignored.version, 0);
        assert_eq!(table.count_rows().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn mismatched_schema_is_rejected_and_table_unchanged() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        DeltaTable::write(location.clone(), vec![ids(&[1])?], SaveMode::Overwrite).await?;
        let err = DeltaTable::write(location.clone(), vec![names(&["x"])?], SaveMode::Append)
            .await
            .expect_err("schema mismatch");
        assert!(matches!(err, TableError::Delta { operation: "write", .. }));

        let table = DeltaTable::open(location).await?;
        assert_eq!(table.version(), 0);
        assert_eq!(table.schema()?.to_string(), "(id:long)");
        Ok(())
    }

    #[tokio::test]
    async fn hook_refreshes_manifest_once_enabled() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        let (mut table, _) =
            DeltaTable::write(location.clone(), vec![ids(&[1])?], SaveMode::Overwrite).await?;
        table
            .set_properties(&[(SYMLINK_MANIFEST_ENABLED.to_string(), "true".to_string())])
            .await?;

        let (table, outcome) =
            DeltaTable::write(location, vec![ids(&[2])?], SaveMode::Append).await?;
        let report = outcome.manifest.expect("hook ran");
        assert_eq!(report.version, table.version());
        assert_eq!(report.data_files.len(), 2);
        Ok(())
    }
}
