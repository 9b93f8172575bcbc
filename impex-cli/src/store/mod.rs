//! Persistence of reporting point records

mod catalog;
pub mod layout;
mod locked;
mod naming;
mod xlsx;

pub use catalog::{HeaderCatalog, ReportingPointCatalog};
pub use locked::LockedStore;
pub use naming::{FileParts, file_parts};
pub use xlsx::XlsxStore;

use std::path::Path;

use anyhow::Result;

use crate::model::{RecordStore, ReportingPoint, ReportingPointRecord};

/// Reads and writes record sets
pub trait DataStore: Send + Sync {
    /// All reporting points in one file. A missing file reads as empty.
    fn read_file(&self, path: &Path) -> Result<RecordStore>;

    /// Records of every file in a directory
    fn read_dir(&self, path: &Path) -> Result<Vec<ReportingPointRecord>>;

    /// Replace the reporting point's unit inside `path`
    fn write_sheet(&self, path: &Path, reporting_point: &ReportingPoint, records: &[ReportingPointRecord]) -> Result<()>;

    /// Write each reporting point to the file its name maps to under `output_dir`
    fn write_records(&self, output_dir: &Path, records: &RecordStore) -> Result<()>;
}
