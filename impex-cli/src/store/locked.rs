//! Reader/writer lock around a data store

use std::path::Path;
use std::sync::RwLock;

use anyhow::{Result, anyhow};

use super::DataStore;
use crate::model::{RecordStore, ReportingPoint, ReportingPointRecord};

/// Reads run concurrently; writes are exclusive of reads and other writes
pub struct LockedStore<S> {
    inner: S,
    lock: RwLock<()>,
}

impl<S: DataStore> LockedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lock: RwLock::new(()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: DataStore> DataStore for LockedStore<S> {
    fn read_file(&self, path: &Path) -> Result<RecordStore> {
        let _guard = self.lock.read().map_err(|_| anyhow!("Data store lock poisoned"))?;
        self.inner.read_file(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<ReportingPointRecord>> {
        let _guard = self.lock.read().map_err(|_| anyhow!("Data store lock poisoned"))?;
        self.inner.read_dir(path)
    }

    fn write_sheet(&self, path: &Path, reporting_point: &ReportingPoint, records: &[ReportingPointRecord]) -> Result<()> {
        let _guard = self.lock.write().map_err(|_| anyhow!("Data store lock poisoned"))?;
        self.inner.write_sheet(path, reporting_point, records)
    }

    fn write_records(&self, output_dir: &Path, records: &RecordStore) -> Result<()> {
        let _guard = self.lock.write().map_err(|_| anyhow!("Data store lock poisoned"))?;
        self.inner.write_records(output_dir, records)
    }
}
