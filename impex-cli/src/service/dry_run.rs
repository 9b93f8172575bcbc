//! Command service that records batches instead of sending them

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use serde::Serialize;

use super::CommandService;
use crate::submit::{ConfirmRecord, DeleteRecord, SubmitRecord};

/// Every batch received, in arrival order
#[derive(Debug, Clone, Default, Serialize)]
pub struct DryRunLog {
    /// Kind of each batch as it arrived: "submit", "delete" or "confirm"
    pub order: Vec<String>,
    pub submits: Vec<Vec<SubmitRecord>>,
    pub deletes: Vec<Vec<DeleteRecord>>,
    pub confirms: Vec<Vec<ConfirmRecord>>,
}

#[derive(Debug, Default)]
pub struct DryRunCommandService {
    log: Mutex<DryRunLog>,
}

impl DryRunCommandService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> DryRunLog {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.log())?)
    }

    fn record<F>(&self, kind: &str, count: usize, push: F) -> Result<()>
    where
        F: FnOnce(&mut DryRunLog),
    {
        let mut entries = self.log.lock().map_err(|_| anyhow!("Dry run log lock poisoned"))?;
        entries.order.push(kind.to_string());
        push(&mut *entries);
        log::info!("[dry run] {} batch of {} records", kind, count);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommandService for DryRunCommandService {
    async fn submit(&self, batch: &[SubmitRecord]) -> Result<()> {
        self.record("submit", batch.len(), |log| log.submits.push(batch.to_vec()))
    }

    async fn delete(&self, batch: &[DeleteRecord]) -> Result<()> {
        self.record("delete", batch.len(), |log| log.deletes.push(batch.to_vec()))
    }

    async fn confirm(&self, batch: &[ConfirmRecord]) -> Result<()> {
        self.record("confirm", batch.len(), |log| log.confirms.push(batch.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Module;

    #[tokio::test]
    async fn test_batches_are_logged_in_order() {
        let service = DryRunCommandService::new();
        let delete = DeleteRecord {
            location: "Site.Crusher".to_string(),
            module: Module::Downtime,
            set_id: 4,
        };

        service.delete(&[delete.clone()]).await.unwrap();
        service.submit(&[]).await.unwrap();

        let log = service.log();
        assert_eq!(log.order, vec!["delete", "submit"]);
        assert_eq!(log.deletes, vec![vec![delete]]);

        let json: serde_json::Value = serde_json::from_str(&service.to_json().unwrap()).unwrap();
        assert_eq!(json["deletes"][0][0]["set_id"], 4);
    }
}
