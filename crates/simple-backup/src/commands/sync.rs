//! Mirror sync command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use simple_backup_archive::sync;
use simple_backup_core::Settings;

use crate::output;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Output the pass report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SyncArgs, config: Option<&Utf8Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    if !args.json {
        output::header("Mirror Sync");
        output::kv("Source", settings.remote_archive_dir.as_str());
        output::kv("Destination", settings.local_archive_dir.as_str());
    }

    let report = sync::sync(
        settings.remote_archive_dir.as_std_path(),
        settings.local_archive_dir.as_std_path(),
    )?;

    if !args.json {
        for failure in &report.failures {
            output::warning(&format!(
                "could not copy {}: {}",
                failure.path.display(),
                failure.message
            ));
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "copied": report.count_copied(),
                "skipped": report.skipped,
                "failed": report.failures.len(),
            })
        );
        return Ok(());
    }

    println!();
    output::success(&format!(
        "Mirror complete: {} copied, {} up to date",
        report.count_copied(),
        report.skipped
    ));

    Ok(())
}
