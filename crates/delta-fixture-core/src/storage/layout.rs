//! Relative paths of the files this crate writes under a table root.
//!
//! delta-rs owns `_delta_log/` and the data files; the only reserved
//! directory managed here is the symlink manifest one.

use std::path::PathBuf;

/// Directory holding symlink format manifests.
pub const SYMLINK_MANIFEST_DIR_NAME: &str = "_symlink_format_manifest";

/// Name of the manifest file inside the manifest directory.
pub const MANIFEST_FILE_NAME: &str = "manifest";

/// Relative path: `_symlink_format_manifest/`
pub fn manifest_rel_dir() -> PathBuf {
    PathBuf::from(SYMLINK_MANIFEST_DIR_NAME)
}

/// Relative path: `_symlink_format_manifest/manifest`
pub fn manifest_rel_path() -> PathBuf {
    manifest_rel_dir().join(MANIFEST_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_path_lives_under_reserved_dir() {
        assert_eq!(
            manifest_rel_path(),
            PathBuf::from("_symlink_format_manifest/manifest")
        );
    }
}
