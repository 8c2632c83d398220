//! `SET TBLPROPERTIES` for `DeltaTable`.
//!
//! delta-rs commits the merged configuration as a new `metaData` action.
//! Before handing the change over, the boolean flags this crate acts on are
//! checked and stored under their canonical spelling. The post-commit hooks
//! run on the property commit too, so enabling
//! `delta.compatibility.symlinkFormatManifest.enabled` refreshes the manifest
//! right away.
use std::collections::HashMap;

use log::info;
use snafu::prelude::*;

use crate::{
    manifest::ManifestReport,
    table::{
        DeltaTable,
        error::{DeltaSnafu, PropertySnafu, TableError},
    },
};

/// Regenerate the symlink manifest after every commit.
pub const SYMLINK_MANIFEST_ENABLED: &str = "delta.compatibility.symlinkFormatManifest.enabled";
/// Table accepts appends only.
pub const APPEND_ONLY: &str = "delta.appendOnly";

const BOOLEAN_PROPERTIES: &[&str] = &[SYMLINK_MANIFEST_ENABLED, APPEND_ONLY];

/// A property value this crate refuses to store.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropertyError {
    /// The value does not parse for this key.
    #[snafu(display("{key} = {value:?} is not valid, expected {expected}"))]
    InvalidValue {
        /// Canonical property key.
        key: String,
        /// Rejected value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}

/// Canonical spelling of `key` and `value`.
///
/// The boolean flags above match case-insensitively and must hold `true` or
/// `false`; every other key passes through untouched.
pub fn validate_property(key: &str, value: &str) -> Result<(String, String), PropertyError> {
    let Some(canonical) = BOOLEAN_PROPERTIES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(key))
    else {
        return Ok((key.to_string(), value.to_string()));
    };

    match parse_bool(value) {
        Some(flag) => Ok((canonical.to_string(), flag.to_string())),
        None => InvalidValueSnafu {
            key: canonical.to_string(),
            value,
            expected: "true or false",
        }
        .fail(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Typed view of the properties this crate reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableProperties {
    /// `delta.compatibility.symlinkFormatManifest.enabled`
    pub symlink_manifest_enabled: bool,
    /// `delta.appendOnly`
    pub append_only: bool,
}

impl TableProperties {
    /// Read the flags from `metaData.configuration`. Missing or unparsable
    /// values count as `false`.
    pub fn from_configuration(configuration: &HashMap<String, String>) -> Self {
        let flag = |name: &str| {
            configuration
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .and_then(|(_, value)| parse_bool(value))
                .unwrap_or(false)
        };
        Self {
            symlink_manifest_enabled: flag(SYMLINK_MANIFEST_ENABLED),
            append_only: flag(APPEND_ONLY),
        }
    }
}

/// Result of a committed property change.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    /// Version of the property commit.
    pub version: i64,
    /// Manifest regenerated by the post-commit hook, if any.
    pub manifest: Option<ManifestReport>,
}

impl DeltaTable {
    /// Merge `properties` into the table configuration.
    ///
    /// Nothing is committed when a value fails validation.
    pub async fn set_properties(
        &mut self,
        properties: &[(String, String)],
    ) -> Result<PropertyChange, TableError> {
        let mut validated = HashMap::new();
        for (key, value) in properties {
            let (key, value) = validate_property(key, value).context(PropertySnafu)?;
            validated.insert(key, value);
        }

        let updated = self
            .inner
            .clone()
            .set_tbl_properties()
            .with_properties(validated)
            .with_raise_if_not_exists(false)
            .await
            .context(DeltaSnafu {
                operation: "set properties",
            })?;
        self.inner = updated;

        let version = self.version();
        info!(
            "committed SET TBLPROPERTIES as version {version} at {}",
            self.location().root().display()
        );

        let manifest = self.run_post_commit_hooks().await?;
        Ok(PropertyChange { version, manifest })
    }
}
