//! Offline query service backed by a JSON capture of the plant service

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Module, QueryService};
use crate::matrix::{MatrixValueRow, RelationshipMatrix};
use crate::model::{FieldValue, ReportingPoint, ReportingPointRecord};
use crate::store::ReportingPointCatalog;

/// A captured record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub full_name: String,
    pub module: String,
    pub id: i64,
    #[serde(default)]
    pub is_confirmed: bool,
    #[serde(default)]
    pub is_deleted: bool,
    /// Start of the record's sample period; records without one match every window
    #[serde(default)]
    pub sample_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub values: BTreeMap<String, Option<FieldValue>>,
}

/// Captured relationship matrix values for one reporting point and cause location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMatrix {
    pub full_name: String,
    pub module: String,
    pub cause_location: String,
    #[serde(default)]
    pub rows: Vec<MatrixValueRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub reporting_points: Vec<ReportingPoint>,
    #[serde(default)]
    pub records: Vec<SnapshotRecord>,
    #[serde(default)]
    pub matrices: Vec<SnapshotMatrix>,
}

pub struct SnapshotService {
    snapshot: Snapshot,
}

fn same_point(full_name: &str, module: &str, rp: &ReportingPoint) -> bool {
    rp.full_name == full_name && rp.module.eq_ignore_ascii_case(module)
}

impl SnapshotService {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

        log::info!(
            "Loaded snapshot with {} reporting points, {} records and {} matrices",
            snapshot.reporting_points.len(),
            snapshot.records.len(),
            snapshot.matrices.len()
        );

        Ok(Self::new(snapshot))
    }

    fn find(&self, full_name: &str, module: &str) -> Result<&ReportingPoint> {
        self.snapshot
            .reporting_points
            .iter()
            .find(|rp| same_point(full_name, module, rp))
            .ok_or_else(|| anyhow!("Reporting point '{}' ({}) not found in snapshot", full_name, module))
    }
}

#[async_trait::async_trait]
impl QueryService for SnapshotService {
    async fn reporting_points(&self, modules: &[Module]) -> Result<Vec<ReportingPoint>> {
        Ok(self
            .snapshot
            .reporting_points
            .iter()
            .filter(|rp| {
                rp.module
                    .parse::<Module>()
                    .map(|m| modules.contains(&m))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn reporting_point(&self, location: &str, module: Module) -> Result<ReportingPoint> {
        self.find(location, module.as_str()).cloned()
    }

    async fn records(
        &self,
        reporting_point: &Arc<ReportingPoint>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReportingPointRecord>> {
        Ok(self
            .snapshot
            .records
            .iter()
            .filter(|r| same_point(&r.full_name, &r.module, reporting_point))
            .filter(|r| r.sample_time.is_none_or(|t| t >= start && t < end))
            .map(|r| ReportingPointRecord {
                reporting_point: Arc::clone(reporting_point),
                id: r.id,
                is_deleted: r.is_deleted,
                is_confirmed: r.is_confirmed,
                values: r.values.clone(),
            })
            .collect())
    }

    async fn relationship_matrix(
        &self,
        reporting_point: &ReportingPoint,
        cause_location: &str,
    ) -> Result<RelationshipMatrix> {
        let rows = self
            .snapshot
            .matrices
            .iter()
            .find(|m| same_point(&m.full_name, &m.module, reporting_point) && m.cause_location == cause_location)
            .map(|m| m.rows.as_slice())
            .unwrap_or_default();

        RelationshipMatrix::from_values(cause_location, rows).with_context(|| {
            format!(
                "Invalid relationship matrix for '{}' at cause location '{}'",
                reporting_point, cause_location
            )
        })
    }
}

impl ReportingPointCatalog for SnapshotService {
    fn lookup(&self, full_name: &str, module: &str, _headers: &[String]) -> Result<ReportingPoint> {
        self.find(full_name, module).cloned()
    }
}
