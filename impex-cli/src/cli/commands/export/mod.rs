//! Export command: plant service records to per-asset workbooks, or one
//! reporting point to a single named workbook

mod handler;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;

use crate::service::Module;

pub use handler::handle_export_command;

#[derive(Debug, Args)]
pub struct ExportCommands {
    /// Plant service snapshot to export from
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Module to export (repeatable; exactly one with --location)
    #[arg(long, required = true)]
    pub module: Vec<Module>,

    /// Export only this reporting point (full name)
    #[arg(long, requires = "file")]
    pub location: Option<String>,

    /// Workbook the single reporting point is written to
    #[arg(long, requires = "location")]
    pub file: Option<PathBuf>,

    /// Start of the sample period (RFC 3339)
    #[arg(long)]
    pub start: DateTime<Utc>,

    /// End of the sample period, exclusive (RFC 3339)
    #[arg(long)]
    pub end: DateTime<Utc>,

    /// Directory the workbooks are written to; base directory of --file
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}
