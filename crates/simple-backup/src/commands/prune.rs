//! Standalone retention prune command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use console::style;
use simple_backup_archive::prune;
use simple_backup_core::Settings;
use std::path::PathBuf;

use crate::output;

#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output the pass report as JSON (implies --yes)
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: PruneArgs, config: Option<&Utf8Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    if !args.json {
        output::header("Retention Prune");
    }

    let trees = [
        (
            settings.remote_archive_dir.clone(),
            settings.remote_retention_days,
        ),
        (
            settings.local_archive_dir.clone(),
            settings.local_retention_days,
        ),
    ];

    let mut candidates: Vec<PathBuf> = Vec::new();
    for (dir, days) in &trees {
        candidates.extend(prune::expired(
            dir.as_std_path(),
            &settings.backup_name,
            *days,
            &settings.timestamp,
        )?);
    }

    if candidates.is_empty() {
        if args.json {
            println!("{}", serde_json::json!({ "removed": 0, "failed": 0 }));
        } else {
            output::info("Nothing to prune");
        }
        return Ok(());
    }

    if !args.json {
        output::info(&format!(
            "{} archive(s) past their retention window:",
            candidates.len()
        ));
        for path in &candidates {
            println!("  {}", style(path.display()).dim());
        }
        println!();
    }

    if !args.yes && !args.json {
        use dialoguer::Confirm;
        if !Confirm::new()
            .with_prompt("Delete these archives?")
            .default(true)
            .interact()?
        {
            output::info("Prune cancelled");
            return Ok(());
        }
    }

    let mut removed = 0;
    let mut failed = 0;
    for (dir, days) in &trees {
        let report = prune::prune(
            dir.as_std_path(),
            &settings.backup_name,
            *days,
            &settings.timestamp,
        )?;
        removed += report.count_removed();
        failed += report.failures.len();
        if !args.json {
            for failure in &report.failures {
                output::warning(&format!(
                    "could not prune {}: {}",
                    failure.path.display(),
                    failure.message
                ));
            }
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::json!({ "removed": removed, "failed": failed })
        );
        return Ok(());
    }

    output::success(&format!("Pruned {removed} archive(s)"));
    Ok(())
}
