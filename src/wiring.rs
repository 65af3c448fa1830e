// Bundler configuration wiring - externals plus a node_modules copy step

use crate::closure::compute_closure;
use crate::copy::{build_copy_entries, CopyPlugin};
use crate::error::ExternalsError;
use crate::externals::{build_externals_map, ExternalsMap};
use crate::lockfile::PackageLock;
use std::any::Any;
use std::fmt;
use std::path::Path;

/// A plugin the bundler runs at build time
pub trait BundlerPlugin: fmt::Debug + Send + Sync {
    /// Plugin name, for logs and listings
    fn name(&self) -> &str;

    /// Run the plugin's build step
    fn apply(&self) -> Result<(), ExternalsError>;

    /// Downcast support for inspecting concrete plugins
    fn as_any(&self) -> &dyn Any;
}

/// The two bundler config fields wiring touches
///
/// Both are optional so a caller's config can be passed through untouched
/// until wiring needs them.
#[derive(Debug, Default)]
pub struct BundlerConfig {
    pub externals: Option<ExternalsMap>,
    pub plugins: Option<Vec<Box<dyn BundlerPlugin>>>,
}

impl BundlerConfig {
    /// Create an empty config with neither field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Externals as JSON, for handing to a JS bundler process
    pub fn externals_json(&self) -> serde_json::Result<String> {
        let empty = ExternalsMap::new();
        serde_json::to_string_pretty(self.externals.as_ref().unwrap_or(&empty))
    }

    /// Run every registered plugin in order
    pub fn apply_plugins(&self) -> Result<(), ExternalsError> {
        for plugin in self.plugins.iter().flatten() {
            tracing::debug!(plugin = plugin.name(), "Applying plugin");
            plugin.apply()?;
        }
        Ok(())
    }
}

/// Mark the dependency closure of `top_level_names` as externals and append
/// a copy plugin that mirrors those packages into `<base_dir>/dist/node_modules`.
///
/// Existing externals with the same name are overwritten; existing plugins are
/// kept in order and the copy plugin goes last.
pub fn wire<S: AsRef<str>>(
    base_dir: &Path,
    config: &mut BundlerConfig,
    lock: &PackageLock,
    top_level_names: &[S],
) {
    let closure = compute_closure(lock, top_level_names);

    config
        .externals
        .get_or_insert_with(ExternalsMap::new)
        .extend(build_externals_map(&closure));

    let entries = build_copy_entries(base_dir, &closure);
    config
        .plugins
        .get_or_insert_with(Vec::new)
        .push(Box::new(CopyPlugin::new(entries)));

    tracing::debug!(
        base_dir = %base_dir.display(),
        packages = closure.len(),
        "Wired externals into bundler config"
    );
}
