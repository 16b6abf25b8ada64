//! Configuration management commands

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Subcommand};
use simple_backup_core::{settings, Settings};

use crate::output;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show(ConfigShowArgs),

    /// Write a commented sample backuprc
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path (defaults to the resolved rc location)
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub async fn run(cmd: ConfigCommands, config: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => show(args, config),
        ConfigCommands::Init(args) => init(args, config),
    }
}

fn show(args: ConfigShowArgs, config: Option<&Utf8Path>) -> Result<()> {
    let resolved = Settings::load(config)?;
    let summary = resolved.summary();

    if args.json {
        let map: serde_json::Map<String, serde_json::Value> = summary
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();
        println!("{}", serde_json::Value::Object(map));
        return Ok(());
    }

    output::header("Configuration");
    for (key, value) in summary {
        output::kv(key, &value);
    }
    Ok(())
}

fn init(args: ConfigInitArgs, config: Option<&Utf8Path>) -> Result<()> {
    let dest = match args.output {
        Some(path) => path,
        None => settings::resolve_rc_path(config)?,
    };

    if dest.exists() && !args.force {
        anyhow::bail!("{dest} already exists; pass --force to overwrite");
    }

    std::fs::write(&dest, settings::sample_rc())?;
    output::success(&format!("Wrote sample configuration to {dest}"));
    output::info("Edit the paths and run `simple-backup config show` to verify");
    Ok(())
}
