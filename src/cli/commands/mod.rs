//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod check;
pub mod fix;
pub mod install;

use anyhow::Result;
use clap::Subcommand;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the lockfile for merge conflicts without modifying it
    Check,

    /// Resolve merge conflicts in the lockfile
    Fix {
        /// Report what would change without writing the lockfile
        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve conflicts, then re-resolve stale entries and finalize the
    /// lockfile
    Install {
        /// Never touch the network
        #[arg(long)]
        offline: bool,

        /// Use a custom registry URL
        #[arg(long)]
        registry: Option<String>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Check => check::run(),
            Self::Fix { dry_run } => fix::run(dry_run),
            Self::Install { offline, registry } => install::run(offline, registry).await,
        }
    }
}
