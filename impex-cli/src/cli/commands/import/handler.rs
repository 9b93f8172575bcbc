use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;

use super::ImportCommands;
use crate::cli::commands::resolve_path;
use crate::config::ImpexConfig;
use crate::diagnostics::{CollectingSink, Level, LogSink};
use crate::model::group_by_reporting_point;
use crate::service::{DryRunCommandService, SnapshotService};
use crate::store::{DataStore, LockedStore, XlsxStore};
use crate::submit::Submitter;

pub async fn handle_import_command(args: ImportCommands, config: &ImpexConfig) -> Result<()> {
    let base = args.path.as_deref();
    let file_path = resolve_path(base, &args.file);
    let snapshot_path = resolve_path(base, &args.snapshot);

    if !file_path.exists() {
        anyhow::bail!("Workbook does not exist: {}", file_path.display());
    }

    let service = Arc::new(SnapshotService::load(&snapshot_path)?);
    let store = LockedStore::new(XlsxStore::new(service.clone()));
    let records = if file_path.is_dir() {
        group_by_reporting_point(store.read_dir(&file_path)?)
    } else {
        store.read_file(&file_path)?
    };

    eprintln!(
        "Read {} records in {} reporting points from {}",
        records.record_count().to_string().bold(),
        records.len().to_string().bold(),
        file_path.display().to_string().cyan()
    );

    let mut options = config.submit_options();
    if let Some(batch_size) = args.batch_size {
        options.batch_size = batch_size;
    }

    let command = DryRunCommandService::new();
    let sink = CollectingSink::forwarding_to(LogSink);
    let summary = Submitter::new(service.as_ref(), &command, &options, &sink)
        .run(&records)
        .await?;

    let json = command.to_json()?;
    match args.output {
        Some(output_path) => {
            let output_path = resolve_path(base, &output_path);
            fs::write(&output_path, &json)
                .with_context(|| format!("Failed to write output to: {}", output_path.display()))?;
            eprintln!("Batches saved to: {}", output_path.display().to_string().bright_green());
        }
        None => println!("{}", json),
    }

    eprintln!();
    eprintln!("{}", "Import summary".bold());
    eprintln!("  Submitted: {}", summary.submitted.to_string().green());
    eprintln!("  Deleted:   {}", summary.deleted.to_string().green());
    eprintln!("  Confirmed: {}", summary.confirmed.to_string().green());
    eprintln!("  Batches:   {}", summary.batches);

    let errors = sink.count_at_least(Level::Error);
    if errors > 0 {
        eprintln!("  Errors:    {}", errors.to_string().red());
    }

    Ok(())
}
