//! Record merge: match FROM records to TO records by a key field and
//! reconcile their values

mod engine;
mod reconcile;

pub use engine::{EmptyTargetPolicy, MergeEngine, MergeOptions, MergeSummary, MergedUnit};
pub use reconcile::{ExclusionPolicy, FieldList, FieldReconciler, NoExclusions};
