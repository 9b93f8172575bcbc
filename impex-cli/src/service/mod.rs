//! Plant data service collaborators
//!
//! The query side provides hierarchy, metadata, records and relationship
//! matrices; the command side accepts submit, delete and confirm batches.

mod dry_run;
mod module;
mod snapshot;

pub use dry_run::{DryRunCommandService, DryRunLog};
pub use module::{Module, UnknownModule};
pub use snapshot::{Snapshot, SnapshotMatrix, SnapshotRecord, SnapshotService};

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::matrix::RelationshipMatrix;
use crate::model::{ReportingPoint, ReportingPointRecord};
use crate::submit::{ConfirmRecord, DeleteRecord, SubmitRecord};

/// Read side of the plant service
#[async_trait::async_trait]
pub trait QueryService: Send + Sync {
    /// Every reporting point in the hierarchy of the given modules, with field metadata
    async fn reporting_points(&self, modules: &[Module]) -> Result<Vec<ReportingPoint>>;

    /// Metadata of a single reporting point
    async fn reporting_point(&self, location: &str, module: Module) -> Result<ReportingPoint>;

    /// Records whose sample period falls in `[start, end)`
    async fn records(
        &self,
        reporting_point: &Arc<ReportingPoint>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReportingPointRecord>>;

    /// Relationship matrix of a reporting point at one cause location
    async fn relationship_matrix(
        &self,
        reporting_point: &ReportingPoint,
        cause_location: &str,
    ) -> Result<RelationshipMatrix>;
}

/// Write side of the plant service
#[async_trait::async_trait]
pub trait CommandService: Send + Sync {
    async fn submit(&self, batch: &[SubmitRecord]) -> Result<()>;

    async fn delete(&self, batch: &[DeleteRecord]) -> Result<()>;

    async fn confirm(&self, batch: &[ConfirmRecord]) -> Result<()>;
}
