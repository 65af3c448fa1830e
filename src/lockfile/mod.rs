// Package-lock manifest model (npm lockfile v1 nested `dependencies` shape)

use crate::error::LockfileError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name-keyed map of installed packages at one level of the tree
pub type DependencyMap = BTreeMap<String, DependencyRecord>;

/// Parsed package-lock.json
///
/// Only `dependencies` is walked by the resolver; the remaining metadata is
/// kept so the manifest can be inspected and re-serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageLock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockfile_version: Option<u32>,
    /// Hoisted installs under the root node_modules
    #[serde(default)]
    pub dependencies: DependencyMap,
}

/// One resolved installation of a package at a point in the tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dev: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    /// Required package name to version range. Only the keys matter here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<BTreeMap<String, String>>,
    /// Copies installed in this package's own node_modules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyMap>,
}

impl DependencyRecord {
    /// Names this package needs at runtime
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.requires
            .iter()
            .flat_map(|requires| requires.keys())
            .map(String::as_str)
    }

    /// Locally nested installs, if any
    pub fn nested(&self) -> Option<&DependencyMap> {
        self.dependencies.as_ref()
    }
}

impl PackageLock {
    /// Parse a package-lock.json from a file path
    pub fn from_file(path: &Path) -> Result<Self, LockfileError> {
        let content = std::fs::read_to_string(path).map_err(|e| LockfileError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let lock: PackageLock =
            serde_json::from_str(&content).map_err(|e| LockfileError::Json {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        tracing::debug!(
            path = %path.display(),
            packages = lock.dependencies.len(),
            "Loaded package lock"
        );

        Ok(lock)
    }

    /// Parse a package-lock.json from a string
    pub fn from_str(content: &str) -> Result<Self, LockfileError> {
        serde_json::from_str(content).map_err(|e| LockfileError::Json {
            path: "<string>".into(),
            error: e.to_string(),
        })
    }
}
