//! Merge command: FROM workbook into TO workbook, keyed on one field

mod handler;

use std::path::PathBuf;

use clap::Args;

pub use handler::handle_merge_command;

#[derive(Debug, Args)]
pub struct MergeCommands {
    /// Workbook whose values are merged in
    #[arg(long)]
    pub from: PathBuf,

    /// Workbook whose record ids are kept
    #[arg(long)]
    pub to: PathBuf,

    /// Workbook the merged records are written to
    #[arg(long)]
    pub output: PathBuf,

    /// Field used to match FROM records with TO records
    #[arg(long)]
    pub key: String,

    /// Base directory for relative file paths
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Field whose TO value is always kept (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
}
