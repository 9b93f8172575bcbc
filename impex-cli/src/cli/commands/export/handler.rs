use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;

use super::ExportCommands;
use crate::cli::commands::resolve_path;
use crate::model::{RecordGroup, RecordStore, ReportingPoint, ReportingPointRecord};
use crate::service::{Module, QueryService, SnapshotService};
use crate::store::{DataStore, LockedStore, XlsxStore};

pub async fn handle_export_command(args: ExportCommands) -> Result<()> {
    if args.start >= args.end {
        anyhow::bail!("Start of the period must be before its end");
    }

    let service = Arc::new(SnapshotService::load(&args.snapshot)?);

    if let (Some(location), Some(file)) = (&args.location, &args.file) {
        let module = match args.module.as_slice() {
            [module] => *module,
            _ => anyhow::bail!("Exporting a single location needs exactly one --module"),
        };
        let file_path = resolve_path(Some(&args.path), file);
        return export_location(service, location, module, &args, &file_path).await;
    }

    let records = collect_records(service.as_ref(), &args).await?;

    if records.is_empty() {
        println!("{}", "No records found for the requested period".yellow());
        return Ok(());
    }

    std::fs::create_dir_all(&args.path)
        .with_context(|| format!("Failed to create output directory: {}", args.path.display()))?;

    let store = LockedStore::new(XlsxStore::new(service.clone()));
    store.write_records(&args.path, &records)?;

    println!(
        "Exported {} records in {} reporting points to {}",
        records.record_count().to_string().green(),
        records.len().to_string().green(),
        args.path.display().to_string().bright_green()
    );

    Ok(())
}

/// One reporting point's records to a sheet of `file_path`
async fn export_location(
    service: Arc<SnapshotService>,
    location: &str,
    module: Module,
    args: &ExportCommands,
    file_path: &Path,
) -> Result<()> {
    let (reporting_point, records) = location_records(service.as_ref(), location, module, args).await?;

    let store = LockedStore::new(XlsxStore::new(service.clone()));
    store.write_sheet(file_path, &reporting_point, &records)?;

    println!(
        "Exported {} records of '{}' to {}",
        records.len().to_string().green(),
        reporting_point,
        file_path.display().to_string().bright_green()
    );

    Ok(())
}

async fn location_records(
    service: &dyn QueryService,
    location: &str,
    module: Module,
    args: &ExportCommands,
) -> Result<(Arc<ReportingPoint>, Vec<ReportingPointRecord>)> {
    let reporting_point = Arc::new(
        service
            .reporting_point(location, module)
            .await
            .with_context(|| format!("Failed to fetch reporting point '{}' ({})", location, module))?,
    );

    let records = service
        .records(&reporting_point, args.start, args.end)
        .await
        .with_context(|| format!("Failed to fetch records for '{}'", reporting_point))?;

    log::info!("Exporting {} records of '{}'", records.len(), reporting_point);
    Ok((reporting_point, records))
}

/// Records of every reporting point in the requested modules; points without records are left out
async fn collect_records(service: &dyn QueryService, args: &ExportCommands) -> Result<RecordStore> {
    let mut store = RecordStore::new();

    for reporting_point in service.reporting_points(&args.module).await? {
        let reporting_point = Arc::new(reporting_point);
        let records = service
            .records(&reporting_point, args.start, args.end)
            .await
            .with_context(|| format!("Failed to fetch records for '{}'", reporting_point))?;

        if records.is_empty() {
            log::debug!("No records for '{}'", reporting_point);
            continue;
        }

        log::info!("Exporting {} records of '{}'", records.len(), reporting_point);
        store.push_group(RecordGroup::new(reporting_point, records));
    }

    Ok(store)
}
