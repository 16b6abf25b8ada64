//! Backup command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use simple_backup_archive::{
    planner, prune, ArchiveOptions, ArchiveWriter, ExclusionSet, LastBackupTracker,
    PruneReport, ARCHIVE_SUFFIX,
};
use simple_backup_core::Settings;
use std::path::Path;

use crate::output;

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Force a full backup regardless of date or history
    #[arg(long)]
    pub full: bool,

    /// Gzip level (1-9)
    #[arg(long, default_value = "6")]
    pub compression: u8,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: BackupArgs, config: Option<&Utf8Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    if !args.json {
        output::header("Backup");
    }

    let tracker = LastBackupTracker::new(settings.last_backup_file.as_std_path());
    let last = tracker.read()?;

    // A tree with a record but no archive files left has no usable history;
    // the planner treats it as a first run.
    let prior = if has_archive_files(settings.remote_archive_dir.as_std_path()) {
        last
    } else {
        None
    };

    let mode = planner::plan(
        &settings.timestamp,
        prior,
        args.full,
        settings.full_day_of_week,
    );
    tracing::debug!(%mode, last = ?prior.map(|s| s.to_string()), "planned backup mode");

    let exclusions = match &settings.exclude_file {
        Some(path) => ExclusionSet::load(path.as_std_path())?,
        None => ExclusionSet::empty(),
    };

    if !args.json {
        output::kv("Mode", &mode.to_string());
        output::kv("Source", settings.dir_to_backup.as_str());
        output::kv("Destination", settings.remote_archive_dir.as_str());
        if !exclusions.is_empty() {
            output::kv("Exclusions", &exclusions.len().to_string());
        }
    }

    let options = ArchiveOptions::new(mode)
        .with_exclusions(exclusions)
        .with_changed_since(prior)
        .with_compression_level(u32::from(args.compression));
    let writer = ArchiveWriter::new(&settings.backup_name, settings.timestamp, options);

    let spinner = (!args.json).then(|| output::spinner("Archiving..."));
    let result = writer
        .create(
            settings.dir_to_backup.as_std_path(),
            settings.remote_archive_dir.as_std_path(),
        )
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = result?;

    tracker.record(&settings.timestamp)?;

    let remote_pruned = prune_tree(
        settings.remote_archive_dir.as_std_path(),
        &settings,
        settings.remote_retention_days,
        args.json,
    )?;
    let local_pruned = prune_tree(
        settings.local_archive_dir.as_std_path(),
        &settings,
        settings.local_retention_days,
        args.json,
    )?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "mode": mode.to_string(),
                "archive": outcome.archive.path,
                "entries": outcome.entry_count,
                "size_bytes": outcome.size_bytes,
                "checksum": outcome.checksum,
                "duration_seconds": outcome.duration_seconds,
                "pruned_remote": remote_pruned.count_removed(),
                "pruned_local": local_pruned.count_removed(),
            })
        );
        return Ok(());
    }

    println!();
    output::success("Backup created successfully");
    output::kv("Archive", &outcome.archive.path.display().to_string());
    output::kv("Entries", &outcome.entry_count.to_string());
    output::kv("Size", &output::human_bytes(outcome.size_bytes));
    output::kv("Checksum", &outcome.checksum);
    output::kv("Duration", &output::human_duration(outcome.duration_seconds));
    if remote_pruned.count_removed() + local_pruned.count_removed() > 0 {
        output::kv(
            "Pruned",
            &format!(
                "{} remote, {} local",
                remote_pruned.count_removed(),
                local_pruned.count_removed()
            ),
        );
    }

    Ok(())
}

/// Retention pass over one tree; delete failures are reported, never fatal.
fn prune_tree(
    dir: &Path,
    settings: &Settings,
    retention_days: u32,
    json: bool,
) -> Result<PruneReport> {
    let report = prune::prune(dir, &settings.backup_name, retention_days, &settings.timestamp)?;
    if !json {
        for failure in &report.failures {
            output::warning(&format!(
                "could not prune {}: {}",
                failure.path.display(),
                failure.message
            ));
        }
    }
    Ok(report)
}

/// True when the directory holds at least one archive-suffixed file.
fn has_archive_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name()
                    .to_string_lossy()
                    .ends_with(ARCHIVE_SUFFIX)
            })
        })
        .unwrap_or(false)
}
