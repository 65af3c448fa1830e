// Copy plugin - copies installed packages next to the bundle at build time

use super::CopyEntry;
use crate::error::{CopyError, ExternalsError};
use crate::wiring::BundlerPlugin;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Outcome of a copy run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyReport {
    /// Number of files written
    pub copied_files: u64,

    /// Entries whose source directory did not exist
    pub skipped: usize,
}

/// File-copy plugin appended to the bundler config by wiring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlugin {
    entries: Vec<CopyEntry>,
    strict: bool,
}

impl CopyPlugin {
    pub const NAME: &'static str = "copy-node-modules";

    /// Create a plugin for the given entries
    pub fn new(entries: Vec<CopyEntry>) -> Self {
        Self {
            entries,
            strict: false,
        }
    }

    /// Fail on a missing source directory instead of skipping it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Entries this plugin will copy, in order
    pub fn entries(&self) -> &[CopyEntry] {
        &self.entries
    }

    /// Copy every entry's source directory to its destination
    ///
    /// Missing sources are skipped and counted unless the plugin is strict:
    /// a package listed in the lockfile may be absent from node_modules when
    /// it is optional or platform-specific.
    pub fn copy(&self) -> Result<CopyReport, CopyError> {
        let mut report = CopyReport::default();

        for entry in &self.entries {
            if !entry.source.is_dir() {
                if self.strict {
                    return Err(CopyError::MissingSource(entry.source.clone()));
                }
                tracing::warn!(
                    source = %entry.source.display(),
                    "Skipping missing package directory"
                );
                report.skipped += 1;
                continue;
            }

            tracing::debug!(
                source = %entry.source.display(),
                destination = %entry.destination.display(),
                "Copying package"
            );
            report.copied_files += copy_dir_all(&entry.source, &entry.destination)?;
        }

        Ok(report)
    }
}

impl BundlerPlugin for CopyPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self) -> Result<(), ExternalsError> {
        let report = self.copy()?;
        tracing::debug!(
            files = report.copied_files,
            skipped = report.skipped,
            "Copied packages"
        );
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CopyError {
    let path = path.to_path_buf();
    move |e| CopyError::Io {
        path,
        error: e.to_string(),
    }
}

/// Recursively copy `src` into `dst`, following symlinks
///
/// Linked packages (`npm link`, workspaces) are copied as real trees so the
/// output does not point back into the source node_modules.
fn copy_dir_all(src: &Path, dst: &Path) -> Result<u64, CopyError> {
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| CopyError::Io {
            path: e.path().unwrap_or(src).to_path_buf(),
            error: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| CopyError::Io {
                path: entry.path().to_path_buf(),
                error: e.to_string(),
            })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err(&target))?;
            continue;
        }

        let mut reader = fs::File::open(entry.path()).map_err(io_err(entry.path()))?;
        let permissions = reader
            .metadata()
            .map_err(io_err(entry.path()))?
            .permissions();
        let mut writer = fs::File::create(&target).map_err(io_err(&target))?;
        io::copy(&mut reader, &mut writer).map_err(io_err(entry.path()))?;
        fs::set_permissions(&target, permissions).map_err(io_err(&target))?;
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy::build_copy_entries;

    fn write_package(base: &Path, name: &str) {
        let dir = base.join("node_modules").join(name);
        fs::create_dir_all(dir.join("lib")).unwrap();
        fs::write(dir.join("package.json"), format!(r#"{{"name":"{}"}}"#, name)).unwrap();
        fs::write(dir.join("lib").join("index.js"), "module.exports = {};").unwrap();
    }

    #[test]
    fn copies_package_trees() {
        let temp = tempfile::tempdir().unwrap();
        write_package(temp.path(), "pend");
        write_package(temp.path(), "fd-slicer");

        let plugin = CopyPlugin::new(build_copy_entries(temp.path(), &["fd-slicer", "pend"]));
        let report = plugin.copy().unwrap();

        assert_eq!(report.copied_files, 4);
        assert_eq!(report.skipped, 0);

        let copied = temp.path().join("dist/node_modules/pend/lib/index.js");
        assert_eq!(
            fs::read_to_string(copied).unwrap(),
            "module.exports = {};"
        );
    }

    #[test]
    fn skips_missing_sources() {
        let temp = tempfile::tempdir().unwrap();
        write_package(temp.path(), "pend");

        let plugin = CopyPlugin::new(build_copy_entries(temp.path(), &["left-pad", "pend"]));
        let report = plugin.copy().unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.copied_files, 2);
        assert!(!temp.path().join("dist/node_modules/left-pad").exists());
    }

    #[test]
    fn apply_through_trait_object() {
        let temp = tempfile::tempdir().unwrap();
        write_package(temp.path(), "xtend");

        let plugin: Box<dyn BundlerPlugin> =
            Box::new(CopyPlugin::new(build_copy_entries(temp.path(), &["xtend"])));

        assert_eq!(plugin.name(), "copy-node-modules");
        assert!(plugin.apply().is_ok());
        assert!(temp
            .path()
            .join("dist/node_modules/xtend/package.json")
            .exists());
    }

    #[test]
    fn empty_plugin_copies_nothing() {
        let report = CopyPlugin::new(Vec::new()).copy().unwrap();
        assert_eq!(report, CopyReport::default());
    }

    #[test]
    fn strict_plugin_rejects_missing_source() {
        let temp = tempfile::tempdir().unwrap();
        write_package(temp.path(), "pend");

        let plugin =
            CopyPlugin::new(build_copy_entries(temp.path(), &["left-pad", "pend"])).strict(true);

        match plugin.copy() {
            Err(CopyError::MissingSource(path)) => {
                assert_eq!(path, temp.path().join("node_modules").join("left-pad"));
            }
            other => panic!("Expected MissingSource, got {:?}", other),
        }
    }

    #[test]
    #[cfg(unix)]
    fn follows_symlinked_directories() {
        let temp = tempfile::tempdir().unwrap();
        let pend = temp.path().join("node_modules").join("pend");
        fs::create_dir_all(pend.join("real")).unwrap();
        fs::write(pend.join("real").join("a.js"), "exports.a = 1;").unwrap();
        std::os::unix::fs::symlink(pend.join("real"), pend.join("linked")).unwrap();

        let report = CopyPlugin::new(build_copy_entries(temp.path(), &["pend"]))
            .copy()
            .unwrap();
        assert_eq!(report.copied_files, 2);

        let linked = temp.path().join("dist/node_modules/pend/linked");
        assert!(linked.is_dir());
        assert!(!fs::symlink_metadata(&linked).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(linked.join("a.js")).unwrap(),
            "exports.a = 1;"
        );
    }

    #[test]
    #[cfg(unix)]
    fn read_failure_is_reported_against_source() {
        let temp = tempfile::tempdir().unwrap();
        write_package(temp.path(), "pend");
        let source = temp.path().join("node_modules").join("pend");
        std::os::unix::fs::symlink(source.join("missing.js"), source.join("broken.js")).unwrap();

        match CopyPlugin::new(build_copy_entries(temp.path(), &["pend"])).copy() {
            Err(CopyError::Io { path, .. }) => assert!(path.starts_with(&source)),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    #[cfg(unix)]
    fn preserves_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let bin = temp.path().join("node_modules").join("esbuild").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("esbuild"), "#!/bin/sh\n").unwrap();
        fs::set_permissions(bin.join("esbuild"), fs::Permissions::from_mode(0o755)).unwrap();

        CopyPlugin::new(build_copy_entries(temp.path(), &["esbuild"]))
            .copy()
            .unwrap();

        let copied = temp.path().join("dist/node_modules/esbuild/bin/esbuild");
        let mode = fs::metadata(copied).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
