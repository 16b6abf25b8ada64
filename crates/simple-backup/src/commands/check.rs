//! Staleness check command
//!
//! Exit code is the notification channel: 0 means the last successful
//! backup is inside the threshold, 1 means a notification is warranted.

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use simple_backup_archive::{should_notify, LastBackupTracker};
use simple_backup_core::Settings;

use crate::output;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Check the local-facing tree's record instead of the remote one
    #[arg(long)]
    pub local: bool,

    /// Output the decision as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CheckArgs, config: Option<&Utf8Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    let record = if args.local {
        &settings.local_last_backup_file
    } else {
        &settings.last_backup_file
    };
    let tracker = LastBackupTracker::new(record.as_std_path());
    let last = tracker.read()?;

    let stale = should_notify(&settings.timestamp, last.as_ref(), settings.notification_hours);

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "stale": stale,
                "last_backup": last.map(|s| s.to_string()),
                "threshold_hours": settings.notification_hours,
            })
        );
    } else {
        match (&last, stale) {
            (None, _) => output::warning("No successful backup recorded"),
            (Some(last), true) => output::warning(&format!(
                "Last successful backup {} is older than {}h",
                last, settings.notification_hours
            )),
            (Some(last), false) => output::success(&format!(
                "Last successful backup {} is within {}h",
                last, settings.notification_hours
            )),
        }
    }

    if stale {
        std::process::exit(1);
    }
    Ok(())
}
