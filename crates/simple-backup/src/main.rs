//! simple-backup CLI - single-shot backup orchestrator
//!
//! This is the main entry point for the simple-backup command-line
//! interface. Each invocation performs exactly one operation (backup, dump,
//! sync, prune, check, deploy, config) and exits; scheduling is the
//! caller's business, as is serializing concurrent invocations against the
//! same archive trees.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    // Run command
    match cli.command {
        Commands::Backup(args) => commands::backup::run(args, cli.config.as_deref()).await,
        Commands::Dump(args) => commands::dump::run(args, cli.config.as_deref()).await,
        Commands::Sync(args) => commands::sync::run(args, cli.config.as_deref()).await,
        Commands::Prune(args) => commands::prune::run(args, cli.config.as_deref()).await,
        Commands::Check(args) => commands::check::run(args, cli.config.as_deref()).await,
        Commands::Deploy(args) => commands::deploy::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
