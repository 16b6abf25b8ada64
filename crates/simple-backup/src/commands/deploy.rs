//! Deploy command
//!
//! Installs the rc file, the exclude file, and this executable on the
//! remote host over scp. Thin glue around the external tool; transport
//! configuration (keys, known hosts, timeouts) belongs to the caller's ssh
//! setup.

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use simple_backup_core::{Error, Settings};
use std::path::PathBuf;
use tokio::process::Command;

use crate::output;

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Destination directory on the remote host (defaults to the login home)
    #[arg(long)]
    pub dest: Option<String>,
}

pub async fn run(args: DeployArgs, config: Option<&Utf8Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    let user = settings
        .remote_user
        .clone()
        .ok_or_else(|| Error::missing_key("REMOTE_USER"))?;
    let host = settings
        .remote_host
        .clone()
        .ok_or_else(|| Error::missing_key("REMOTE_HOST"))?;

    let scp = which::which("scp").map_err(|_| Error::command_failed("scp", "not found on PATH"))?;

    let mut sources: Vec<PathBuf> = vec![settings.rc_path.clone().into_std_path_buf()];
    if let Some(exclude) = &settings.exclude_file {
        if exclude.exists() {
            sources.push(exclude.clone().into_std_path_buf());
        }
    }
    sources.push(std::env::current_exe()?);

    let target = format!("{user}@{host}:{}", args.dest.as_deref().unwrap_or(""));

    output::header("Deploy");
    output::kv("Target", &target);
    for source in &sources {
        output::kv("Install", &source.display().to_string());
    }

    let command_output = Command::new(&scp)
        .args(&sources)
        .arg(&target)
        .output()
        .await
        .map_err(|e| Error::command_failed("scp", e.to_string()))?;

    if !command_output.status.success() {
        let stderr = String::from_utf8_lossy(&command_output.stderr);
        return Err(Error::command_failed(
            "scp",
            format!(
                "exit code {}: {}",
                command_output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        )
        .into());
    }

    println!();
    output::success(&format!("Installed {} file(s) on {host}", sources.len()));
    Ok(())
}
