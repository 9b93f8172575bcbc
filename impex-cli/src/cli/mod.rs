//! Command line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::ImpexConfig;
use commands::export::{ExportCommands, handle_export_command};
use commands::import::{ImportCommands, handle_import_command};
use commands::merge::{MergeCommands, handle_merge_command};

#[derive(Debug, Parser)]
#[command(name = "impex")]
#[command(about = "Import, export and merge reporting point records in Excel workbooks")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge records of one workbook into the matching records of another
    Merge(MergeCommands),
    /// Submit workbook records to the plant service
    Import(ImportCommands),
    /// Export plant service records to one workbook per asset
    Export(ExportCommands),
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = ImpexConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Merge(args) => handle_merge_command(args, &config),
        Commands::Import(args) => handle_import_command(args, &config).await,
        Commands::Export(args) => handle_export_command(args).await,
    }
}
