//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

// Re-export command types for convenience
pub use crate::commands::backup::BackupArgs;
pub use crate::commands::check::CheckArgs;
pub use crate::commands::config::ConfigCommands;
pub use crate::commands::deploy::DeployArgs;
pub use crate::commands::dump::DumpArgs;
pub use crate::commands::prune::PruneArgs;
pub use crate::commands::sync::SyncArgs;

/// simple-backup - single-shot backup orchestrator
#[derive(Parser, Debug)]
#[command(name = "simple-backup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the backuprc file (default: $BACKUPRC, then $HOME/.backuprc)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive the configured tree (full or incremental)
    Backup(BackupArgs),

    /// Archive a database dump
    Dump(DumpArgs),

    /// Mirror the remote-facing archive tree into the local-facing one
    Sync(SyncArgs),

    /// Delete archives past their retention window, in both trees
    Prune(PruneArgs),

    /// Exit non-zero when the last successful backup is stale
    Check(CheckArgs),

    /// Install the configuration and executable on the remote host
    Deploy(DeployArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}
