//! Field-by-field reconciliation of a FROM record with its matched TO record

use std::collections::HashSet;

use crate::model::{FieldValues, ReportingPoint, ReportingPointRecord};

/// Decides which fields keep the TO value during a merge
pub trait ExclusionPolicy: Send + Sync {
    fn excluded_fields(&self, _reporting_point: &ReportingPoint) -> HashSet<String> {
        HashSet::new()
    }
}

/// No excluded fields: FROM always wins where both sides have the field
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExclusions;

impl ExclusionPolicy for NoExclusions {}

/// Fixed list of excluded field names, applied to every reporting point
#[derive(Debug, Default, Clone)]
pub struct FieldList {
    fields: HashSet<String>,
}

impl FieldList {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl ExclusionPolicy for FieldList {
    fn excluded_fields(&self, _reporting_point: &ReportingPoint) -> HashSet<String> {
        self.fields.clone()
    }
}

/// Merges two records that share a merge key
pub struct FieldReconciler<'a> {
    exclusions: &'a dyn ExclusionPolicy,
}

impl<'a> FieldReconciler<'a> {
    pub fn new(exclusions: &'a dyn ExclusionPolicy) -> Self {
        Self { exclusions }
    }

    /// Build the merged record.
    ///
    /// Keys come from `from`. A key excluded by the policy takes the TO value;
    /// a key the TO record lacks has no TO value and is left out. Everything
    /// else takes the FROM value. The merged record keeps the TO id and the
    /// FROM flags and reporting point.
    pub fn reconcile(&self, from: &ReportingPointRecord, to: &ReportingPointRecord) -> ReportingPointRecord {
        let excluded = self.exclusions.excluded_fields(&from.reporting_point);
        let mut values = FieldValues::new();

        for (key, from_value) in &from.values {
            match to.values.get(key) {
                None => continue,
                Some(to_value) if excluded.contains(key) => {
                    values.insert(key.clone(), to_value.clone());
                }
                Some(_) => {
                    values.insert(key.clone(), from_value.clone());
                }
            }
        }

        ReportingPointRecord {
            reporting_point: from.reporting_point.clone(),
            id: to.id,
            is_deleted: from.is_deleted,
            is_confirmed: from.is_confirmed,
            values,
        }
    }
}
