//! Where a sheet's reporting point metadata comes from

use anyhow::{Context, Result};

use crate::model::{FieldIndex, FieldType, ReportingPoint, ReportingPointField};

/// Looks up the reporting point a sheet belongs to
pub trait ReportingPointCatalog: Send + Sync {
    /// `headers` are the sheet's field column headers, in column order
    fn lookup(&self, full_name: &str, module: &str, headers: &[String]) -> Result<ReportingPoint>;
}

/// Infers metadata from the sheet itself: every header is a writable string field.
///
/// Used where no plant service is available, e.g. merging two workbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderCatalog;

impl ReportingPointCatalog for HeaderCatalog {
    fn lookup(&self, full_name: &str, module: &str, headers: &[String]) -> Result<ReportingPoint> {
        let fields = headers
            .iter()
            .map(|h| ReportingPointField::new(h.clone(), h.clone(), FieldType::String))
            .collect();

        let fields = FieldIndex::new(fields)
            .with_context(|| format!("Sheet for '{}' has duplicate column headers", full_name))?;

        Ok(ReportingPoint::new(full_name, module, fields))
    }
}
