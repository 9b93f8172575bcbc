//! In-memory record sets grouped by reporting point

use std::collections::HashMap;
use std::sync::Arc;

use super::{ReportingPoint, ReportingPointId, ReportingPointRecord};

/// Records of a single reporting point, in source order
#[derive(Debug, Clone)]
pub struct RecordGroup {
    pub reporting_point: Arc<ReportingPoint>,
    pub records: Vec<ReportingPointRecord>,
}

impl RecordGroup {
    pub fn new(reporting_point: Arc<ReportingPoint>, records: Vec<ReportingPointRecord>) -> Self {
        Self {
            reporting_point,
            records,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.reporting_point.full_name
    }
}

/// A record set: reporting point identity -> ordered records
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    groups: Vec<RecordGroup>,
    index: HashMap<ReportingPointId, usize>,
}

/// Group a flat sequence of records by their reporting point.
///
/// Record order within each group follows input order.
pub fn group_by_reporting_point<I>(records: I) -> RecordStore
where
    I: IntoIterator<Item = ReportingPointRecord>,
{
    let mut store = RecordStore::new();
    for record in records {
        store.push_record(record);
    }
    store
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a whole group, appending to an existing group with the same identity
    pub fn push_group(&mut self, group: RecordGroup) {
        match self.index.get(&group.reporting_point.id()) {
            Some(&idx) => self.groups[idx].records.extend(group.records),
            None => {
                self.index.insert(group.reporting_point.id(), self.groups.len());
                self.groups.push(group);
            }
        }
    }

    pub fn push_record(&mut self, record: ReportingPointRecord) {
        let id = record.reporting_point.id();
        match self.index.get(&id) {
            Some(&idx) => self.groups[idx].records.push(record),
            None => {
                let group = RecordGroup::new(Arc::clone(&record.reporting_point), vec![record]);
                self.index.insert(id, self.groups.len());
                self.groups.push(group);
            }
        }
    }

    pub fn get(&self, id: &ReportingPointId) -> Option<&RecordGroup> {
        self.index.get(id).map(|&idx| &self.groups[idx])
    }

    /// Every group whose reporting point has this full name (any module)
    pub fn find_by_full_name<'a>(&'a self, full_name: &'a str) -> impl Iterator<Item = &'a RecordGroup> + 'a {
        self.groups.iter().filter(move |g| g.full_name() == full_name)
    }

    pub fn groups(&self) -> &[RecordGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<RecordGroup> {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    /// All records, group by group
    pub fn records(&self) -> impl Iterator<Item = &ReportingPointRecord> {
        self.groups.iter().flat_map(|g| g.records.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldIndex;

    fn point(full_name: &str, module: &str) -> Arc<ReportingPoint> {
        Arc::new(ReportingPoint::new(full_name, module, FieldIndex::default()))
    }

    #[test]
    fn test_empty_input_yields_empty_store() {
        let store = group_by_reporting_point(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_groups_preserve_record_order() {
        let crusher = point("Site.Crusher", "Downtime");
        let conveyor = point("Site.Conveyor", "Downtime");

        let store = group_by_reporting_point(vec![
            ReportingPointRecord::new(Arc::clone(&crusher), 1),
            ReportingPointRecord::new(Arc::clone(&conveyor), 2),
            ReportingPointRecord::new(Arc::clone(&crusher), 3),
        ]);

        assert_eq!(store.len(), 2);
        let crusher_group = store.get(&crusher.id()).unwrap();
        let ids: Vec<i64> = crusher_group.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_identity_compares_by_value() {
        let a = point("Site.Crusher", "Downtime");
        let b = point("Site.Crusher", "Downtime");

        let store = group_by_reporting_point(vec![
            ReportingPointRecord::new(a, 1),
            ReportingPointRecord::new(b, 2),
        ]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn test_find_by_full_name_spans_modules() {
        let mut store = RecordStore::new();
        store.push_group(RecordGroup::new(point("Site.Crusher", "Downtime"), Vec::new()));
        store.push_group(RecordGroup::new(point("Site.Crusher", "Production"), Vec::new()));
        store.push_group(RecordGroup::new(point("Site.Conveyor", "Downtime"), Vec::new()));

        assert_eq!(store.find_by_full_name("Site.Crusher").count(), 2);
        assert_eq!(store.find_by_full_name("Site.Mill").count(), 0);
    }

    #[test]
    fn test_push_group_appends_to_same_identity() {
        let crusher = point("Site.Crusher", "Downtime");
        let mut store = RecordStore::new();
        store.push_group(RecordGroup::new(
            Arc::clone(&crusher),
            vec![ReportingPointRecord::new(Arc::clone(&crusher), 1)],
        ));
        store.push_group(RecordGroup::new(
            Arc::clone(&crusher),
            vec![ReportingPointRecord::new(Arc::clone(&crusher), 2)],
        ));

        assert_eq!(store.len(), 1);
        assert_eq!(store.record_count(), 2);
    }
}
