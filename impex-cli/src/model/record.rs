//! Records belonging to a reporting point

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{FieldValue, ReportingPoint};

/// Field name (id or display name) to value. `None` marks an empty cell.
pub type FieldValues = BTreeMap<String, Option<FieldValue>>;

/// One data row of a reporting point
#[derive(Debug, Clone, PartialEq)]
pub struct ReportingPointRecord {
    pub reporting_point: Arc<ReportingPoint>,
    /// Downstream identifier; 0 means the record has not been created yet
    pub id: i64,
    pub is_deleted: bool,
    pub is_confirmed: bool,
    pub values: FieldValues,
}

impl ReportingPointRecord {
    pub fn new(reporting_point: Arc<ReportingPoint>, id: i64) -> Self {
        Self {
            reporting_point,
            id,
            is_deleted: false,
            is_confirmed: false,
            values: FieldValues::new(),
        }
    }

    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), Some(value.into()));
        self
    }

    /// The value of a field, treating an empty cell like a missing one
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field).and_then(|v| v.as_ref())
    }
}
