//! Matching records across two record sets and producing merged output

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::reconcile::{ExclusionPolicy, FieldReconciler};
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::model::{FieldValue, RecordGroup, RecordStore, ReportingPoint, ReportingPointRecord};
use crate::store::DataStore;

const COMPONENT: &str = "impex::merge";

/// What to do when the matched TO reporting point has no records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyTargetPolicy {
    /// Warn and skip the reporting point
    #[default]
    Skip,
    /// Treat every FROM record as unmatched and create it
    CreateAll,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Field used to match FROM records to TO records
    pub merge_field: String,
    pub empty_target: EmptyTargetPolicy,
}

impl MergeOptions {
    pub fn new(merge_field: impl Into<String>) -> Self {
        Self {
            merge_field: merge_field.into(),
            empty_target: EmptyTargetPolicy::default(),
        }
    }
}

/// Merged output of one reporting point
#[derive(Debug, Clone)]
pub struct MergedUnit {
    pub reporting_point: Arc<ReportingPoint>,
    pub records: Vec<ReportingPointRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub reporting_points_merged: usize,
    pub reporting_points_skipped: usize,
    pub records_created: usize,
    pub records_merged: usize,
    pub records_skipped: usize,
    pub records_written: usize,
}

/// Outcome of looking for a FROM record's counterpart
enum RecordMatch<'a> {
    None,
    Single(&'a ReportingPointRecord),
    Multiple(usize),
}

pub struct MergeEngine<'a> {
    options: MergeOptions,
    exclusions: &'a dyn ExclusionPolicy,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> MergeEngine<'a> {
    pub fn new(options: MergeOptions, exclusions: &'a dyn ExclusionPolicy, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            options,
            exclusions,
            sink,
        }
    }

    /// Merge every FROM reporting point into its TO counterpart.
    ///
    /// Data-shape mismatches are reported to the sink and skipped; nothing
    /// here fails.
    pub fn merge(&self, from: &RecordStore, to: &RecordStore) -> (Vec<MergedUnit>, MergeSummary) {
        let mut summary = MergeSummary::default();
        let mut units = Vec::new();

        for from_group in from.groups() {
            self.sink.emit(DiagnosticEvent::progress(
                COMPONENT,
                format!("Merging Reporting Point '{}'", from_group.reporting_point),
            ));

            let candidates: Vec<&RecordGroup> = to.find_by_full_name(from_group.full_name()).collect();

            let to_group = match candidates.as_slice() {
                [] => {
                    self.sink.emit(DiagnosticEvent::ReportingPointNotFound {
                        full_name: from_group.full_name().to_string(),
                    });
                    summary.reporting_points_skipped += 1;
                    continue;
                }
                [single] => *single,
                many => {
                    self.sink.emit(DiagnosticEvent::MultipleReportingPoints {
                        full_name: from_group.full_name().to_string(),
                        count: many.len(),
                    });
                    summary.reporting_points_skipped += 1;
                    continue;
                }
            };

            if to_group.records.is_empty() && self.options.empty_target == EmptyTargetPolicy::Skip {
                self.sink.emit(DiagnosticEvent::EmptyTarget {
                    full_name: from_group.full_name().to_string(),
                });
                summary.reporting_points_skipped += 1;
                continue;
            }

            let records = self.merge_group(from_group, to_group, &mut summary);
            summary.reporting_points_merged += 1;

            units.push(MergedUnit {
                reporting_point: Arc::clone(&from_group.reporting_point),
                records,
            });
        }

        (units, summary)
    }

    fn merge_group(
        &self,
        from_group: &RecordGroup,
        to_group: &RecordGroup,
        summary: &mut MergeSummary,
    ) -> Vec<ReportingPointRecord> {
        let reconciler = FieldReconciler::new(self.exclusions);
        let merge_field = self.options.merge_field.as_str();
        let mut merged = Vec::with_capacity(from_group.records.len());

        for from_record in &from_group.records {
            let Some(merge_value) = merge_key(from_record, merge_field) else {
                self.sink.emit(DiagnosticEvent::MissingMergeKey {
                    full_name: from_group.full_name().to_string(),
                    merge_field: merge_field.to_string(),
                    record_id: from_record.id,
                });
                summary.records_skipped += 1;
                continue;
            };

            match find_match(&to_group.records, merge_field, merge_value) {
                RecordMatch::None => {
                    self.sink.emit(DiagnosticEvent::trace(
                        COMPONENT,
                        format!("No matching TO record for merge key '{}'. Creating new record", merge_value),
                    ));
                    merged.push(new_record_from(from_record));
                    summary.records_created += 1;
                }
                RecordMatch::Multiple(count) => {
                    self.sink.emit(DiagnosticEvent::MultipleTargetRecords {
                        full_name: from_group.full_name().to_string(),
                        merge_key: merge_value.to_string(),
                        count,
                    });
                    summary.records_skipped += 1;
                }
                RecordMatch::Single(to_record) => {
                    self.sink.emit(DiagnosticEvent::trace(
                        COMPONENT,
                        format!("Merging key '{}'", merge_value),
                    ));
                    merged.push(reconciler.reconcile(from_record, to_record));
                    summary.records_merged += 1;
                }
            }
        }

        merged
    }

    /// Merge and persist each reporting point's output as one sheet of `destination`
    pub fn run(
        &self,
        from: &RecordStore,
        to: &RecordStore,
        store: &dyn DataStore,
        destination: &Path,
    ) -> Result<MergeSummary> {
        let (units, mut summary) = self.merge(from, to);

        for unit in &units {
            self.sink.emit(DiagnosticEvent::progress(
                COMPONENT,
                format!(
                    "Writing '{}' records to file '{}'",
                    unit.records.len(),
                    destination.display()
                ),
            ));

            store
                .write_sheet(destination, &unit.reporting_point, &unit.records)
                .with_context(|| {
                    format!(
                        "Failed to write merged records for '{}' to {}",
                        unit.reporting_point,
                        destination.display()
                    )
                })?;
            summary.records_written += unit.records.len();
        }

        Ok(summary)
    }
}

/// The record's merge key; blank strings count as missing
fn merge_key<'r>(record: &'r ReportingPointRecord, merge_field: &str) -> Option<&'r FieldValue> {
    record.value(merge_field).filter(|v| match v {
        FieldValue::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn find_match<'r>(candidates: &'r [ReportingPointRecord], merge_field: &str, key: &FieldValue) -> RecordMatch<'r> {
    let mut matches = candidates.iter().filter(|r| r.value(merge_field) == Some(key));

    match (matches.next(), matches.next()) {
        (None, _) => RecordMatch::None,
        (Some(single), None) => RecordMatch::Single(single),
        (Some(_), Some(_)) => RecordMatch::Multiple(2 + matches.count()),
    }
}

/// Unmatched FROM record: not yet created downstream, values taken as-is
fn new_record_from(from: &ReportingPointRecord) -> ReportingPointRecord {
    ReportingPointRecord {
        reporting_point: Arc::clone(&from.reporting_point),
        id: 0,
        is_deleted: from.is_deleted,
        is_confirmed: from.is_confirmed,
        values: from.values.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Level};
    use crate::merge::{FieldList, NoExclusions};
    use crate::model::{FieldIndex, group_by_reporting_point};
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn make_point(full_name: &str, module: &str) -> Arc<ReportingPoint> {
        Arc::new(ReportingPoint::new(full_name, module, FieldIndex::default()))
    }

    fn make_record(rp: &Arc<ReportingPoint>, id: i64, key: &str, x: i64) -> ReportingPointRecord {
        ReportingPointRecord::new(Arc::clone(rp), id)
            .with_value("key", key)
            .with_value("X", x)
    }

    fn make_engine<'a>(sink: &'a CollectingSink) -> MergeEngine<'a> {
        MergeEngine::new(MergeOptions::new("key"), &NoExclusions, sink)
    }

    #[derive(Default)]
    struct MemoryStore {
        written: Mutex<Vec<(PathBuf, String, Vec<i64>)>>,
    }

    impl DataStore for MemoryStore {
        fn read_file(&self, _path: &Path) -> Result<RecordStore> {
            Ok(RecordStore::new())
        }

        fn read_dir(&self, _path: &Path) -> Result<Vec<ReportingPointRecord>> {
            Ok(Vec::new())
        }

        fn write_sheet(&self, path: &Path, reporting_point: &ReportingPoint, records: &[ReportingPointRecord]) -> Result<()> {
            self.written.lock().unwrap().push((
                path.to_path_buf(),
                reporting_point.full_name.clone(),
                records.iter().map(|r| r.id).collect(),
            ));
            Ok(())
        }

        fn write_records(&self, _output_dir: &Path, _records: &RecordStore) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_matched_record_takes_to_id_and_from_values() {
        let from_rp = make_point("Site.Crusher", "Downtime");
        let to_rp = make_point("Site.Crusher", "Downtime");
        let from = group_by_reporting_point(vec![make_record(&from_rp, 0, "A", 1)]);
        let to = group_by_reporting_point(vec![make_record(&to_rp, 42, "A", 9)]);

        let sink = CollectingSink::new();
        let (units, summary) = make_engine(&sink).merge(&from, &to);

        assert_eq!(units.len(), 1);
        let record = &units[0].records[0];
        assert_eq!(record.id, 42);
        assert_eq!(record.value("X"), Some(&FieldValue::Int(1)));
        assert_eq!(summary.records_merged, 1);
        assert_eq!(sink.count_at_least(Level::Warning), 0);
    }

    #[test]
    fn test_unmatched_record_is_created_with_from_values() {
        let rp = make_point("Site.Crusher", "Downtime");
        let from_record = make_record(&rp, 17, "B", 3);
        let from = group_by_reporting_point(vec![from_record.clone()]);
        let to = group_by_reporting_point(vec![make_record(&rp, 42, "A", 9)]);

        let sink = CollectingSink::new();
        let (units, summary) = make_engine(&sink).merge(&from, &to);

        let record = &units[0].records[0];
        assert_eq!(record.id, 0);
        assert_eq!(record.values, from_record.values);
        assert!(Arc::ptr_eq(&record.reporting_point, &rp));
        assert_eq!(summary.records_created, 1);
    }

    #[test]
    fn test_empty_target_is_skipped_with_one_warning() {
        let rp = make_point("Site.Crusher", "Downtime");
        let from = group_by_reporting_point(vec![make_record(&rp, 0, "A", 1)]);
        let mut to = RecordStore::new();
        to.push_group(RecordGroup::new(Arc::clone(&rp), Vec::new()));

        let sink = CollectingSink::new();
        let (units, summary) = make_engine(&sink).merge(&from, &to);

        assert!(units.is_empty());
        assert_eq!(summary.reporting_points_skipped, 1);
        assert_eq!(sink.at_level(Level::Warning).len(), 1);
        assert_eq!(sink.count_at_least(Level::Error), 0);
    }

    #[test]
    fn test_empty_target_create_all_policy() {
        let rp = make_point("Site.Crusher", "Downtime");
        let from = group_by_reporting_point(vec![make_record(&rp, 7, "A", 1), make_record(&rp, 8, "B", 2)]);
        let mut to = RecordStore::new();
        to.push_group(RecordGroup::new(Arc::clone(&rp), Vec::new()));

        let sink = CollectingSink::new();
        let options = MergeOptions {
            merge_field: "key".to_string(),
            empty_target: EmptyTargetPolicy::CreateAll,
        };
        let (units, summary) = MergeEngine::new(options, &NoExclusions, &sink).merge(&from, &to);

        assert_eq!(units[0].records.len(), 2);
        assert!(units[0].records.iter().all(|r| r.id == 0));
        assert_eq!(summary.records_created, 2);
    }

    #[test]
    fn test_missing_reporting_point_is_reported() {
        let from = group_by_reporting_point(vec![make_record(&make_point("Site.Mill", "Downtime"), 0, "A", 1)]);
        let to = group_by_reporting_point(vec![make_record(&make_point("Site.Crusher", "Downtime"), 1, "A", 1)]);

        let sink = CollectingSink::new();
        let (units, _) = make_engine(&sink).merge(&from, &to);

        assert!(units.is_empty());
        assert!(matches!(
            sink.at_level(Level::Error).as_slice(),
            [DiagnosticEvent::ReportingPointNotFound { full_name }] if full_name == "Site.Mill"
        ));
    }

    #[test]
    fn test_multiple_to_reporting_points_are_reported() {
        let from = group_by_reporting_point(vec![make_record(&make_point("Site.Crusher", "Downtime"), 0, "A", 1)]);
        let to = group_by_reporting_point(vec![
            make_record(&make_point("Site.Crusher", "Downtime"), 1, "A", 1),
            make_record(&make_point("Site.Crusher", "Production"), 2, "A", 1),
        ]);

        let sink = CollectingSink::new();
        let (units, summary) = make_engine(&sink).merge(&from, &to);

        assert!(units.is_empty());
        assert_eq!(summary.reporting_points_skipped, 1);
        assert!(matches!(
            sink.at_level(Level::Error).as_slice(),
            [DiagnosticEvent::MultipleReportingPoints { count: 2, .. }]
        ));
    }

    #[test]
    fn test_multiple_to_records_skip_only_that_record() {
        let rp = make_point("Site.Crusher", "Downtime");
        let from = group_by_reporting_point(vec![make_record(&rp, 0, "A", 1), make_record(&rp, 0, "C", 5)]);
        let to = group_by_reporting_point(vec![
            make_record(&rp, 10, "A", 9),
            make_record(&rp, 11, "A", 8),
            make_record(&rp, 12, "C", 4),
        ]);

        let sink = CollectingSink::new();
        let (units, summary) = make_engine(&sink).merge(&from, &to);

        let ids: Vec<i64> = units[0].records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![12]);
        assert_eq!(summary.records_skipped, 1);
        assert!(matches!(
            sink.at_level(Level::Error).as_slice(),
            [DiagnosticEvent::MultipleTargetRecords { count: 2, merge_key, .. }] if merge_key == "A"
        ));
    }

    #[test]
    fn test_missing_merge_key_skips_record() {
        let rp = make_point("Site.Crusher", "Downtime");
        let keyless = ReportingPointRecord::new(Arc::clone(&rp), 3).with_value("X", 1i64);
        let blank = ReportingPointRecord::new(Arc::clone(&rp), 4).with_value("key", "  ");
        let from = group_by_reporting_point(vec![keyless, blank, make_record(&rp, 0, "A", 1)]);
        let to = group_by_reporting_point(vec![make_record(&rp, 42, "A", 9)]);

        let sink = CollectingSink::new();
        let (units, summary) = make_engine(&sink).merge(&from, &to);

        assert_eq!(units[0].records.len(), 1);
        assert_eq!(summary.records_skipped, 2);
        assert_eq!(sink.at_level(Level::Error).len(), 2);
    }

    #[test]
    fn test_identical_sets_round_trip() {
        let rp = make_point("Site.Crusher", "Downtime");
        let records = vec![make_record(&rp, 1, "A", 1), make_record(&rp, 2, "B", 2)];
        let from = group_by_reporting_point(records.clone());
        let to = group_by_reporting_point(records.clone());

        let sink = CollectingSink::new();
        let (units, _) = make_engine(&sink).merge(&from, &to);

        assert_eq!(units[0].records, records);
    }

    #[test]
    fn test_exclusions_reach_reconciler() {
        let rp = make_point("Site.Crusher", "Downtime");
        let from = group_by_reporting_point(vec![make_record(&rp, 0, "A", 1)]);
        let to = group_by_reporting_point(vec![make_record(&rp, 42, "A", 9)]);

        let sink = CollectingSink::new();
        let policy = FieldList::new(["X"]);
        let (units, _) = MergeEngine::new(MergeOptions::new("key"), &policy, &sink).merge(&from, &to);

        assert_eq!(units[0].records[0].value("X"), Some(&FieldValue::Int(9)));
    }

    #[test]
    fn test_run_writes_one_sheet_per_reporting_point() {
        let crusher = make_point("Site.Crusher", "Downtime");
        let conveyor = make_point("Site.Conveyor", "Downtime");
        let from = group_by_reporting_point(vec![make_record(&crusher, 0, "A", 1), make_record(&conveyor, 0, "Z", 1)]);
        let to = group_by_reporting_point(vec![make_record(&crusher, 42, "A", 9), make_record(&conveyor, 43, "Q", 9)]);

        let sink = CollectingSink::new();
        let store = MemoryStore::default();
        let destination = PathBuf::from("merged.xlsx");
        let summary = make_engine(&sink).run(&from, &to, &store, &destination).unwrap();

        let written = store.written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], (destination.clone(), "Site.Crusher".to_string(), vec![42]));
        assert_eq!(written[1], (destination, "Site.Conveyor".to_string(), vec![0]));
        assert_eq!(summary.records_written, 2);
    }
}
