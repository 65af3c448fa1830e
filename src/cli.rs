// CLI commands for resolving externals from a package-lock

use crate::{
    closure::compute_closure,
    config::{ExternalsConfig, CONFIG_FILE, LOCKFILE},
    copy::build_copy_entries,
    externals::build_externals_map,
    lockfile::PackageLock,
    wiring::{wire, BundlerConfig},
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Resolve package-lock dependency closures into bundler externals
#[derive(Parser, Debug)]
#[command(name = "lockfile-externals", version, about)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Project location shared by the lockfile-reading subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Directory holding node_modules and package-lock.json (default: current directory)
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Path to package-lock.json (default: <base-dir>/package-lock.json)
    #[arg(short, long)]
    pub lockfile: Option<PathBuf>,
}

impl ProjectArgs {
    /// Base directory, defaulting to the working directory
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Lockfile path, defaulting to `<base-dir>/package-lock.json`
    pub fn lockfile_path(&self) -> PathBuf {
        self.lockfile
            .clone()
            .unwrap_or_else(|| self.base_dir().join(LOCKFILE))
    }

    fn load(&self) -> Result<PackageLock> {
        Ok(PackageLock::from_file(&self.lockfile_path())?)
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the dependency closure of the given packages, one per line
    Closure {
        /// Top-level package names
        #[arg(required = true)]
        packages: Vec<String>,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Print the externals map for the closure of the given packages
    Externals {
        /// Top-level package names
        #[arg(required = true)]
        packages: Vec<String>,

        #[command(flatten)]
        project: ProjectArgs,

        /// Print as JSON instead of `name = value` lines
        #[arg(long)]
        json: bool,
    },

    /// Print the node_modules copy instructions for the closure
    CopyEntries {
        /// Top-level package names
        #[arg(required = true)]
        packages: Vec<String>,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Wire externals from externals.toml and print the resulting externals JSON
    Wire {
        /// Config file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,

        /// Override the config's base directory
        #[arg(short, long)]
        base_dir: Option<PathBuf>,

        /// Also run the copy step into <base-dir>/dist/node_modules
        #[arg(long)]
        copy: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Closure { packages, project } => Self::closure_cmd(&packages, &project),
            Commands::Externals {
                packages,
                project,
                json,
            } => Self::externals_cmd(&packages, &project, json),
            Commands::CopyEntries { packages, project } => {
                Self::copy_entries_cmd(&packages, &project)
            }
            Commands::Wire {
                config,
                base_dir,
                copy,
            } => Self::wire_cmd(&config, base_dir, copy),
        }
    }

    fn closure_cmd(packages: &[String], project: &ProjectArgs) -> Result<()> {
        let lock = project.load()?;
        for name in compute_closure(&lock, packages) {
            println!("{}", name);
        }
        Ok(())
    }

    fn externals_cmd(packages: &[String], project: &ProjectArgs, json: bool) -> Result<()> {
        let lock = project.load()?;
        let externals = build_externals_map(&compute_closure(&lock, packages));

        if json {
            println!("{}", serde_json::to_string_pretty(&externals)?);
        } else {
            for (name, spec) in &externals {
                println!("{} = {}", name, spec);
            }
        }
        Ok(())
    }

    fn copy_entries_cmd(packages: &[String], project: &ProjectArgs) -> Result<()> {
        let lock = project.load()?;
        let closure = compute_closure(&lock, packages);

        for entry in build_copy_entries(&project.base_dir(), &closure) {
            println!(
                "{} -> {}",
                entry.source.display(),
                entry.destination.display()
            );
        }
        Ok(())
    }

    fn wire_cmd(config_path: &Path, base_dir: Option<PathBuf>, copy: bool) -> Result<()> {
        let mut config = ExternalsConfig::from_file(config_path)?;
        config.validate()?;
        if let Some(base_dir) = base_dir {
            config.project.base_dir = base_dir;
        }
        if config.externals.packages.is_empty() {
            bail!(
                "No packages listed under [externals] in {}",
                config_path.display()
            );
        }

        let lockfile = config.lockfile_path();
        let lock = PackageLock::from_file(&lockfile)
            .with_context(|| format!("while wiring {}", config_path.display()))?;

        let mut bundler = BundlerConfig::new();
        wire(
            &config.project.base_dir,
            &mut bundler,
            &lock,
            &config.externals.packages,
        );

        println!("{}", bundler.externals_json()?);

        if copy {
            bundler.apply_plugins()?;
            eprintln!(
                "✓ Copied packages into {}",
                config
                    .project
                    .base_dir
                    .join(crate::copy::OUTPUT_DIR)
                    .join(crate::copy::NODE_MODULES_DIR)
                    .display()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_closure_command() {
        let cli = Cli::parse_from(["lockfile-externals", "closure", "yauzl", "xtend"]);
        match cli.command {
            Commands::Closure { packages, project } => {
                assert_eq!(packages, vec!["yauzl", "xtend"]);
                assert_eq!(
                    project.lockfile_path(),
                    PathBuf::from(".").join("package-lock.json")
                );
            }
            other => panic!("Expected closure command, got {:?}", other),
        }
    }

    #[test]
    fn parse_wire_command_with_global_verbose() {
        let cli = Cli::parse_from(["lockfile-externals", "wire", "--copy", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Wire { copy: true, base_dir: None, .. }
        ));
    }

    #[test]
    fn closure_requires_packages() {
        assert!(Cli::try_parse_from(["lockfile-externals", "closure"]).is_err());
    }

    #[test]
    fn wire_cmd_copies_packages() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path();
        std::fs::write(
            base.join("package-lock.json"),
            include_str!("../tests/fixtures/package-lock.json"),
        )
        .unwrap();
        let pend = base.join("node_modules").join("pend");
        std::fs::create_dir_all(&pend).unwrap();
        std::fs::write(pend.join("index.js"), "").unwrap();

        let config_path = base.join(CONFIG_FILE);
        std::fs::write(&config_path, "[externals]\npackages = [\"pend\"]\n").unwrap();

        Commands::Wire {
            config: config_path,
            base_dir: Some(base.to_path_buf()),
            copy: true,
        }
        .run()
        .unwrap();

        assert!(base.join("dist/node_modules/pend/index.js").exists());
    }

    #[test]
    fn wire_cmd_rejects_empty_package_list() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "[externals]\npackages = []\n").unwrap();

        let result = Commands::Wire {
            config: config_path,
            base_dir: None,
            copy: false,
        }
        .run();
        assert!(result.is_err());
    }

    #[test]
    fn lockfile_defaults_under_base_dir_for_every_subcommand() {
        let expected = PathBuf::from("/srv/app").join("package-lock.json");
        for args in [
            &["lockfile-externals", "closure", "yauzl", "--base-dir", "/srv/app"][..],
            &["lockfile-externals", "externals", "yauzl", "-b", "/srv/app", "--json"][..],
            &["lockfile-externals", "copy-entries", "yauzl", "--base-dir", "/srv/app"][..],
        ] {
            let project = match Cli::parse_from(args).command {
                Commands::Closure { project, .. }
                | Commands::Externals { project, .. }
                | Commands::CopyEntries { project, .. } => project,
                other => panic!("Unexpected command {:?}", other),
            };
            assert_eq!(project.lockfile_path(), expected, "for {:?}", args);
        }
    }

    #[test]
    fn explicit_lockfile_wins_over_base_dir() {
        let project = ProjectArgs {
            base_dir: Some(PathBuf::from("/srv/app")),
            lockfile: Some(PathBuf::from("/locks/package-lock.json")),
        };
        assert_eq!(
            project.lockfile_path(),
            PathBuf::from("/locks/package-lock.json")
        );
        assert_eq!(project.base_dir(), PathBuf::from("/srv/app"));
    }

    #[test]
    fn closure_cmd_reads_lockfile_from_base_dir() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("package-lock.json"),
            include_str!("../tests/fixtures/package-lock.json"),
        )
        .unwrap();

        let result = Commands::Closure {
            packages: vec!["yauzl".to_string()],
            project: ProjectArgs {
                base_dir: Some(temp.path().to_path_buf()),
                lockfile: None,
            },
        }
        .run();
        assert!(result.is_ok());

        let missing = Commands::Closure {
            packages: vec!["yauzl".to_string()],
            project: ProjectArgs {
                base_dir: Some(temp.path().join("elsewhere")),
                lockfile: None,
            },
        }
        .run();
        assert!(missing.is_err());
    }
}
