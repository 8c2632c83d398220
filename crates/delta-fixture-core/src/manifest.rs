//! Compatibility manifests for readers that cannot parse the Delta log.
//!
//! The symlink format manifest lists the live data files of one snapshot so
//! Hive/Presto style readers can treat the table as a symlink-input table:
//!
//! ```text
//! <root>/_symlink_format_manifest/manifest
//!   file:/tmp/my_delta_table/part-00000-<uuid>-c000.snappy.parquet
//! ```
//!
//! Entries are absolute `file:` URIs, sorted, one per line, each line
//! terminated by `\n`. The file is replaced atomically so concurrent readers
//! see either the previous or the new listing. An empty table yields an empty
//! manifest file.
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::debug;
use snafu::prelude::*;

use crate::{
    storage::{self, StorageError, TableLocation, layout},
    table::error::{StorageSnafu, TableError, UnsupportedManifestModeSnafu},
};

/// Mode string accepted by `DeltaTable::generate`.
pub const SYMLINK_FORMAT_MANIFEST: &str = "symlink_format_manifest";

/// Kinds of manifest that can be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestMode {
    /// `_symlink_format_manifest/manifest`.
    SymlinkFormat,
}

impl FromStr for ManifestMode {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(SYMLINK_FORMAT_MANIFEST) {
            Ok(ManifestMode::SymlinkFormat)
        } else {
            UnsupportedManifestModeSnafu { mode: s }.fail()
        }
    }
}

impl fmt::Display for ManifestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestMode::SymlinkFormat => f.write_str(SYMLINK_FORMAT_MANIFEST),
        }
    }
}

/// What a manifest generation wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReport {
    /// Directory holding the manifest, relative to the table root.
    pub manifest_dir: PathBuf,
    /// Manifest file, relative to the table root.
    pub manifest_path: PathBuf,
    /// Entries written, in file order.
    pub data_files: Vec<String>,
    /// Table version the manifest describes.
    pub version: i64,
}

/// Manifest entry for one data file path as recorded in the log.
fn entry_for(root: &Path, data_path: &str) -> String {
    if data_path.starts_with("file:") {
        return data_path.to_string();
    }
    format!("file:{}", root.join(data_path).display())
}

/// Sorted manifest entries for the live files in `data_files`.
pub fn symlink_manifest_entries(root: &Path, data_files: &[String]) -> Vec<String> {
    let mut entries: Vec<String> = data_files
        .iter()
        .map(|path| entry_for(root, path))
        .collect();
    entries.sort();
    entries
}

fn render(entries: &[String]) -> String {
    entries.iter().map(|e| format!("{e}\n")).collect()
}

/// Write `_symlink_format_manifest/manifest` listing `data_files`, the live
/// files of snapshot `version` relative to the table root.
pub async fn generate_symlink_manifest(
    location: &TableLocation,
    version: i64,
    data_files: &[String],
) -> Result<ManifestReport, TableError> {
    let root = location.absolute_root().context(StorageSnafu)?;
    let entries = symlink_manifest_entries(&root, data_files);

    let rel = layout::manifest_rel_path();
    storage::write_atomic(location, &rel, render(&entries).as_bytes())
        .await
        .context(StorageSnafu)?;

    debug!(
        "wrote symlink manifest for version {} with {} entries under {}",
        version,
        entries.len(),
        root.display()
    );

    Ok(ManifestReport {
        manifest_dir: layout::manifest_rel_dir(),
        manifest_path: rel,
        data_files: entries,
        version,
    })
}

/// Read back the entries of an existing symlink manifest.
///
/// Returns `None` when no manifest has been generated.
pub async fn read_symlink_manifest(
    location: &TableLocation,
) -> Result<Option<Vec<String>>, TableError> {
    match storage::read_to_string(location, &layout::manifest_rel_path()).await {
        Ok(body) => Ok(Some(body.lines().map(str::to_string).collect())),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(source) => Err(TableError::Storage { source }),
    }
}
