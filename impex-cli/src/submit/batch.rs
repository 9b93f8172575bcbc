//! Command payloads and batching

use serde::{Deserialize, Serialize};

use super::SubmitField;
use crate::service::Module;

/// Create or update one record. `set_id` 0 creates a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRecord {
    pub location: String,
    pub module: Module,
    pub set_id: i64,
    pub fields: Vec<SubmitField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRecord {
    pub location: String,
    pub module: Module,
    pub set_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmRecord {
    pub location: String,
    pub module: Module,
    pub set_id: i64,
}

/// Split `items` into batches of at most `batch_size` (a size of 0 is treated as 1)
pub fn batches<T>(items: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_respect_size() {
        let items: Vec<u32> = (0..7).collect();
        let sizes: Vec<usize> = batches(&items, 3).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_zero_batch_size_sends_one_at_a_time() {
        let items = [1, 2];
        assert_eq!(batches(&items, 0).count(), 2);
    }

    #[test]
    fn test_no_items_no_batches() {
        let items: [u32; 0] = [];
        assert_eq!(batches(&items, 50).count(), 0);
    }

    #[test]
    fn test_submit_record_serializes_module_name() {
        let record = SubmitRecord {
            location: "Site.Crusher".to_string(),
            module: Module::Downtime,
            set_id: 0,
            fields: vec![SubmitField::new("Cause", Some("101".to_string()))],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["module"], "Downtime");
        assert_eq!(json["fields"][0]["value"], "101");
    }
}
