// Copy entries - mirror installed packages into the output node_modules

pub mod plugin;

pub use plugin::{CopyPlugin, CopyReport};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding installed packages
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Bundle output directory, relative to the base directory
pub const OUTPUT_DIR: &str = "dist";

/// One directory copy from an installed package to the bundle output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyEntry {
    /// `<base>/node_modules/<name>`
    pub source: PathBuf,

    /// `<base>/dist/node_modules/<name>`
    pub destination: PathBuf,
}

impl CopyEntry {
    /// Entry for a single package under `base_dir`
    pub fn for_package(base_dir: &Path, name: &str) -> Self {
        Self {
            source: base_dir.join(NODE_MODULES_DIR).join(name),
            destination: base_dir
                .join(OUTPUT_DIR)
                .join(NODE_MODULES_DIR)
                .join(name),
        }
    }
}

/// Build one copy entry per name, in input order
pub fn build_copy_entries<S: AsRef<str>>(base_dir: &Path, names: &[S]) -> Vec<CopyEntry> {
    names
        .iter()
        .map(|name| CopyEntry::for_package(base_dir, name.as_ref()))
        .collect()
}
