//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Environment variable naming the interpreter `verify` inspects.
pub const PYTHON_ENV_VAR: &str = "PREPKIT_PYTHON";

/// prepkit - Workshop environment verification and data staging.
#[derive(Debug, Parser)]
#[command(name = "prepkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the workshop root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output (also lists data files already present)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show problems and summaries
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check installed Python packages against an environment file (default)
    Verify(VerifyArgs),

    /// Download workshop data files that are missing locally
    Fetch(FetchArgs),

    /// List built-in data manifests
    Presets,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `verify` command.
///
/// `Default` does not consult the environment; use
/// [`VerifyArgs::from_env`] when no arguments were parsed.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VerifyArgs {
    /// Environment file to read (default: environment.yml in the workshop root)
    #[arg(short, long, value_name = "PATH")]
    pub environment: Option<PathBuf>,

    /// Python interpreter whose packages are inspected
    #[arg(long, value_name = "EXE", env = "PREPKIT_PYTHON")]
    pub python: Option<String>,

    /// Scan these directories instead of asking the interpreter (repeatable)
    #[arg(long, value_name = "DIR")]
    pub site_packages: Vec<PathBuf>,
}

impl VerifyArgs {
    /// Defaults, with `python` taken from `PREPKIT_PYTHON` if it is set.
    pub fn from_env() -> Self {
        Self::with_python(std::env::var(PYTHON_ENV_VAR).ok())
    }

    fn with_python(python: Option<String>) -> Self {
        Self {
            python: python.filter(|p| !p.is_empty()),
            ..Default::default()
        }
    }
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FetchArgs {
    /// Data manifest to use (default: data.yml in the workshop root, else the default preset)
    #[arg(short, long, value_name = "PATH", conflicts_with = "preset")]
    pub manifest: Option<PathBuf>,

    /// Built-in manifest to use
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override the manifest's destination directory
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Download every file even if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Download the auxiliary archive but do not unpack it
    #[arg(long)]
    pub no_extract: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
