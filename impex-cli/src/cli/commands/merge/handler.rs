use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use colored::*;

use super::MergeCommands;
use crate::cli::commands::resolve_path;
use crate::config::ImpexConfig;
use crate::diagnostics::{CollectingSink, Level, LogSink};
use crate::merge::{MergeEngine, MergeSummary};
use crate::store::{DataStore, HeaderCatalog, LockedStore, XlsxStore};

pub fn handle_merge_command(args: MergeCommands, config: &ImpexConfig) -> Result<()> {
    let base = args.path.as_deref();
    let from_path = resolve_path(base, &args.from);
    let to_path = resolve_path(base, &args.to);
    let output_path = resolve_path(base, &args.output);

    if args.key.trim().is_empty() {
        anyhow::bail!("The merge key field must not be empty");
    }

    println!(
        "Merging {} into {} on '{}'",
        from_path.display().to_string().cyan(),
        to_path.display().to_string().cyan(),
        args.key.bold()
    );

    let start = Instant::now();
    let store = LockedStore::new(XlsxStore::new(Arc::new(HeaderCatalog)));

    let from = store.read_file(&from_path)?;
    let to = store.read_file(&to_path)?;

    let options = config.merge_options(args.key);
    let exclusions = config.merge_exclusions(&args.exclude);
    let sink = CollectingSink::forwarding_to(LogSink);

    let summary = MergeEngine::new(options, &exclusions, &sink).run(&from, &to, &store, &output_path)?;

    print_summary(&summary, &sink);
    println!(
        "Output written to {} in {:.2}s",
        output_path.display().to_string().bright_green(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn print_summary(summary: &MergeSummary, sink: &CollectingSink) {
    println!();
    println!("{}", "Merge summary".bold());
    println!("  Reporting points merged:  {}", summary.reporting_points_merged.to_string().green());
    println!("  Reporting points skipped: {}", summary.reporting_points_skipped.to_string().yellow());
    println!("  Records merged:           {}", summary.records_merged.to_string().green());
    println!("  Records created:          {}", summary.records_created.to_string().green());
    println!("  Records skipped:          {}", summary.records_skipped.to_string().yellow());
    println!("  Records written:          {}", summary.records_written);

    let warnings = sink.at_level(Level::Warning).len();
    let errors = sink.count_at_least(Level::Error);
    if warnings > 0 || errors > 0 {
        println!(
            "  Diagnostics:              {} warnings, {} errors",
            warnings.to_string().yellow(),
            errors.to_string().red()
        );
    }
}
