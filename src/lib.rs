//! Resolve the transitive dependency closure of npm packages from a
//! package-lock manifest, mark it as bundler externals and mirror the
//! installed packages next to the bundle output.
//!
//! ```
//! use lockfile_externals::{compute_closure, PackageLock};
//!
//! let lock = PackageLock::from_str(r#"{
//!   "dependencies": {
//!     "yauzl": { "requires": { "fd-slicer": "~1.1.0" } },
//!     "fd-slicer": { "requires": { "pend": "~1.2.0" } },
//!     "pend": {}
//!   }
//! }"#).unwrap();
//!
//! assert_eq!(compute_closure(&lock, &["yauzl"]), ["fd-slicer", "pend", "yauzl"]);
//! ```

pub mod cli;
pub mod closure;
pub mod config;
pub mod copy;
pub mod error;
pub mod externals;
pub mod lockfile;
pub mod wiring;

pub use closure::{compute_closure, Scope};
pub use copy::{build_copy_entries, CopyEntry, CopyPlugin, CopyReport};
pub use error::{ConfigError, CopyError, ExternalsError, LockfileError};
pub use externals::{build_externals_map, ExternalsMap};
pub use lockfile::{DependencyRecord, PackageLock};
pub use wiring::{wire, BundlerConfig, BundlerPlugin};
