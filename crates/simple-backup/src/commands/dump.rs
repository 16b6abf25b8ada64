//! Database dump command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use simple_backup_archive::{dump_database, prune, LastBackupTracker};
use simple_backup_core::{Error, Settings};

use crate::output;

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: DumpArgs, config: Option<&Utf8Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    let user = settings
        .mysql_user
        .clone()
        .ok_or_else(|| Error::missing_key("MYSQL_USER"))?;

    if !args.json {
        output::header("Database Dump");
        output::kv("Destination", settings.remote_archive_dir.as_str());
    }

    let spinner = (!args.json).then(|| output::spinner("Dumping databases..."));
    let result = dump_database(
        &settings.backup_name,
        &settings.timestamp,
        &user,
        settings.mysql_password.as_deref(),
        settings.remote_archive_dir.as_std_path(),
    )
    .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = result?;

    let tracker = LastBackupTracker::new(settings.last_backup_file.as_std_path());
    tracker.record(&settings.timestamp)?;

    let report = prune::prune(
        settings.remote_archive_dir.as_std_path(),
        &settings.backup_name,
        settings.remote_retention_days,
        &settings.timestamp,
    )?;
    if !args.json {
        for failure in &report.failures {
            output::warning(&format!(
                "could not prune {}: {}",
                failure.path.display(),
                failure.message
            ));
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "archive": outcome.archive.path,
                "size_bytes": outcome.size_bytes,
                "checksum": outcome.checksum,
                "duration_seconds": outcome.duration_seconds,
                "pruned_remote": report.count_removed(),
            })
        );
        return Ok(());
    }

    println!();
    output::success("Database dump archived");
    output::kv("Archive", &outcome.archive.path.display().to_string());
    output::kv("Size", &output::human_bytes(outcome.size_bytes));
    output::kv("Checksum", &outcome.checksum);
    output::kv("Duration", &output::human_duration(outcome.duration_seconds));

    Ok(())
}
