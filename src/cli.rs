//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// Prepare a Debian/Ubuntu or macOS machine for Python and Node development.
#[derive(Parser, Debug)]
#[command(
    name = "devprep",
    about = "Install build dependencies and nvm on Ubuntu/Debian or macOS",
    version = option_env!("DEVPREP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Settings file (default: $XDG_CONFIG_HOME/devprep/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
