// externals.toml parsing - which packages to externalize and where they live

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "externals.toml";

/// Default lockfile name, relative to the base directory
pub const LOCKFILE: &str = "package-lock.json";

/// Parsed externals.toml
#[derive(Debug, Deserialize, Default)]
pub struct ExternalsConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub externals: ExternalsSection,
}

/// Project section
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Directory holding node_modules and receiving dist/
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Lockfile path, relative to `base_dir` unless absolute
    #[serde(default = "default_lockfile")]
    pub lockfile: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            lockfile: default_lockfile(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_lockfile() -> PathBuf {
    PathBuf::from(LOCKFILE)
}

/// Externals section
#[derive(Debug, Deserialize, Default)]
pub struct ExternalsSection {
    /// Top-level packages whose closure becomes external
    #[serde(default)]
    pub packages: Vec<String>,
}

impl ExternalsConfig {
    /// Parse externals.toml from a file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse externals.toml from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: "<string>".into(),
            error: e.to_string(),
        })
    }

    /// Validate the package list
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.externals.packages {
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "Package names cannot be empty".into(),
                ));
            }
            if name.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "Package name '{}' must not contain whitespace",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Lockfile location with `base_dir` applied
    pub fn lockfile_path(&self) -> PathBuf {
        self.project.base_dir.join(&self.project.lockfile)
    }
}
