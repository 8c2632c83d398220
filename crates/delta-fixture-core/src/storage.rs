//! Local file helpers for the files this crate owns.
//!
//! The Delta log and data files are read and written by delta-rs. What is
//! left here is the small set of IO primitives the manifest writer needs:
//! write-then-rename replacement of a file and reading it back, both
//! addressed relative to a [`TableLocation`].

mod error;
pub mod layout;
mod table_location;

pub use error::StorageError;
pub(crate) use error::{IoSnafu, UnsupportedLocationSnafu};
pub use table_location::TableLocation;

use std::{
    io,
    path::{Path, PathBuf},
};

use snafu::{Backtrace, prelude::*};
use tokio::{fs, io::AsyncWriteExt};

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

fn classify_io(path: &Path, e: io::Error) -> StorageError {
    let path = path.display().to_string();
    match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound {
            path,
            source: e,
            backtrace: Backtrace::capture(),
        },
        _ => StorageError::Io {
            path,
            source: e,
            backtrace: Backtrace::capture(),
        },
    }
}

/// Removes a half-written temporary file unless disarmed.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Call this after a successful rename.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Replace `rel_path` inside `location` with `contents`.
///
/// The bytes go to a hidden sibling file that is synced and then renamed
/// over the target, so a reader sees the old file or the new one and never
/// a prefix of either. On any failure the sibling is removed.
pub async fn write_atomic(
    location: &TableLocation,
    rel_path: &Path,
    contents: &[u8],
) -> StorageResult<()> {
    let abs = location.root().join(rel_path);
    if let Some(parent) = abs.parent() {
        fs::create_dir_all(parent).await.context(IoSnafu {
            path: parent.display().to_string(),
        })?;
    }

    let file_name = abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = abs.with_file_name(format!(".{file_name}.tmp"));
    let mut guard = TempFileGuard::new(tmp_path.clone());

    {
        let tmp_display = tmp_path.display().to_string();
        let mut file = fs::File::create(&tmp_path).await.context(IoSnafu {
            path: tmp_display.as_str(),
        })?;
        file.write_all(contents).await.context(IoSnafu {
            path: tmp_display.as_str(),
        })?;
        file.sync_all().await.context(IoSnafu {
            path: tmp_display.as_str(),
        })?;
    }

    fs::rename(&tmp_path, &abs).await.context(IoSnafu {
        path: abs.display().to_string(),
    })?;

    guard.disarm();
    Ok(())
}

/// Read the file at `rel_path` within `location` as UTF-8.
///
/// A missing file yields [`StorageError::NotFound`].
pub async fn read_to_string(location: &TableLocation, rel_path: &Path) -> StorageResult<String> {
    let abs = location.root().join(rel_path);
    fs::read_to_string(&abs)
        .await
        .map_err(|e| classify_io(&abs, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn dir_entries(dir: &Path) -> io::Result<Vec<String>> {
        let mut names = std::fs::read_dir(dir)?
            .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    #[tokio::test]
    async fn write_atomic_creates_parent_directories() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        let rel_path = Path::new("nested/deep/dir/file.txt");
        write_atomic(&location, rel_path, b"nested content").await?;

        let read_back = tokio::fs::read_to_string(tmp.path().join(rel_path)).await?;
        assert_eq!(read_back, "nested content");
        Ok(())
    }

    #[tokio::test]
    async fn write_atomic_overwrites_existing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());
        let rel_path = Path::new("overwrite.txt");

        write_atomic(&location, rel_path, b"original").await?;
        write_atomic(&location, rel_path, b"updated").await?;

        let read_back = read_to_string(&location, rel_path).await?;
        assert_eq!(read_back, "updated");
        assert_eq!(dir_entries(tmp.path())?, vec!["overwrite.txt".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_atomic_removes_its_temp_file() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        // A non-empty directory where the file should go makes the rename fail
        // after the temp file was fully written.
        std::fs::create_dir_all(tmp.path().join("manifest/inner"))?;

        let err = write_atomic(&location, Path::new("manifest"), b"data")
            .await
            .expect_err("rename onto a directory");
        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(dir_entries(tmp.path())?, vec!["manifest".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn read_to_string_returns_not_found_for_missing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        let err = read_to_string(&location, Path::new("does_not_exist.txt"))
            .await
            .expect_err("expected NotFound error");
        assert!(matches!(err, StorageError::NotFound { .. }));
        Ok(())
    }
}
