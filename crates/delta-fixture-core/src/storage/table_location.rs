use std::path::{Path, PathBuf};

use snafu::ResultExt;

use crate::storage::{IoSnafu, StorageResult, UnsupportedLocationSnafu};

/// Root directory of a Delta table on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLocation(PathBuf);

impl TableLocation {
    /// Location for a local directory, taken as-is.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        TableLocation(root.into())
    }

    /// Parse a user-supplied location.
    ///
    /// Plain paths and `file:` URIs are accepted. Any other `scheme://`
    /// prefix is refused, since only local tables are provisioned.
    pub fn parse(location: &str) -> StorageResult<Self> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return UnsupportedLocationSnafu {
                location,
                reason: "location is empty",
            }
            .fail();
        }

        if let Some(rest) = trimmed
            .strip_prefix("file://")
            .or_else(|| trimmed.strip_prefix("file:"))
        {
            return Ok(TableLocation::local(rest));
        }

        if let Some((scheme, _)) = trimmed.split_once("://") {
            return UnsupportedLocationSnafu {
                location,
                reason: format!("scheme {scheme:?} is not supported, only local paths"),
            }
            .fail();
        }

        Ok(TableLocation::local(trimmed))
    }

    /// The table root as given by the caller (possibly relative).
    pub fn root(&self) -> &Path {
        &self.0
    }

    /// Absolute form of the table root, without resolving symlinks.
    ///
    /// Manifest entries must be absolute so external readers can resolve
    /// them independently of the writer's working directory.
    pub fn absolute_root(&self) -> StorageResult<PathBuf> {
        std::path::absolute(&self.0).context(IoSnafu {
            path: self.0.display().to_string(),
        })
    }
}
