//! Import command: workbook records to submit, delete and confirm batches

mod handler;

use std::path::PathBuf;

use clap::Args;

pub use handler::handle_import_command;

#[derive(Debug, Args)]
pub struct ImportCommands {
    /// Workbook to import, or a directory of workbooks
    #[arg(long)]
    pub file: PathBuf,

    /// Plant service snapshot providing metadata and relationship matrices
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Base directory for relative file paths
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Records per command batch (overrides the config file)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Write the batches as JSON to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}
