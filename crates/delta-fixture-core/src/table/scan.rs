//! Reading a `DeltaTable` back through DataFusion.
//!
//! The current snapshot is exposed as a `DeltaTableProvider` on a throwaway
//! `SessionContext`; delta-rs registers the table's object store on it and
//! prunes to the live files.
use std::sync::Arc;

use deltalake::{
    arrow::array::RecordBatch,
    datafusion::{dataframe::DataFrame, prelude::SessionContext},
    delta_datafusion::{DeltaScanConfig, DeltaTableProvider},
};
use snafu::prelude::*;

use crate::table::{
    DeltaTable,
    error::{DeltaSnafu, ScanSnafu, TableError},
};

impl DeltaTable {
    fn frame(&self) -> Result<DataFrame, TableError> {
        let provider = DeltaTableProvider::try_new(
            self.snapshot()?.clone(),
            self.inner.log_store(),
            DeltaScanConfig::default(),
        )
        .context(DeltaSnafu { operation: "scan" })?;

        let ctx = SessionContext::new();
        ctx.read_table(Arc::new(provider)).context(ScanSnafu {
            path: self.location().root().display().to_string(),
        })
    }

    /// Read all rows of the current snapshot.
    pub async fn scan(&self) -> Result<Vec<RecordBatch>, TableError> {
        self.frame()?.collect().await.context(ScanSnafu {
            path: self.location().root().display().to_string(),
        })
    }

    /// Number of rows in the current snapshot.
    pub async fn count_rows(&self) -> Result<usize, TableError> {
        self.frame()?.count().await.context(ScanSnafu {
            path: self.location().root().display().to_string(),
        })
    }
}
