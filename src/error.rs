// Error types for lockfile loading, config parsing and copy execution

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the fallible edges of the crate
///
/// Closure resolution and wiring never fail; only the I/O around them does.
/// Individual error types are exposed through `From` conversions.
#[derive(Debug, Error)]
pub enum ExternalsError {
    #[error("Lockfile error: {0}")]
    Lockfile(#[from] LockfileError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Copy failed: {0}")]
    Copy(#[from] CopyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while reading a package-lock file
#[derive(Debug, Error)]
pub enum LockfileError {
    #[error("I/O error reading {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("JSON parsing error in {path}: {error}")]
    Json { path: PathBuf, error: String },
}

/// Errors while reading an externals.toml config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("TOML parsing error in {path}: {error}")]
    Toml { path: PathBuf, error: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors while copying installed packages next to the bundle
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("source directory '{}' does not exist", .0.display())]
    MissingSource(PathBuf),

    #[error("failed to copy into {path}: {error}")]
    Io { path: PathBuf, error: String },
}
