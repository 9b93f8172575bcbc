//! Record set to command batches: submit everything, then delete, then confirm

use anyhow::{Context, Result};

use super::batch::{ConfirmRecord, DeleteRecord, SubmitRecord, batches};
use super::resolve::{CodeResolver, MatrixCache, ResolverFields};
use super::translate::{FieldTranslator, TranslationOptions};
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::model::{RecordStore, ReportingPointRecord};
use crate::service::{CommandService, Module, QueryService};

const COMPONENT: &str = "impex::submit";

pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub batch_size: usize,
    pub translation: TranslationOptions,
    pub resolver: ResolverFields,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            translation: TranslationOptions::default(),
            resolver: ResolverFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitSummary {
    pub submitted: usize,
    pub deleted: usize,
    pub confirmed: usize,
    pub batches: usize,
}

pub struct Submitter<'a> {
    query: &'a dyn QueryService,
    command: &'a dyn CommandService,
    options: &'a SubmitOptions,
    sink: &'a dyn DiagnosticSink,
}

fn module_of(record: &ReportingPointRecord) -> Result<Module> {
    record
        .reporting_point
        .module
        .parse()
        .with_context(|| format!("Reporting point '{}' has an unknown module", record.reporting_point.full_name))
}

impl<'a> Submitter<'a> {
    pub fn new(
        query: &'a dyn QueryService,
        command: &'a dyn CommandService,
        options: &'a SubmitOptions,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            query,
            command,
            options,
            sink,
        }
    }

    pub async fn run(&self, records: &RecordStore) -> Result<SubmitSummary> {
        let all: Vec<&ReportingPointRecord> = records.records().collect();
        let mut summary = SubmitSummary::default();

        for chunk in batches(&all, self.options.batch_size) {
            // Matrices live for one batch only
            let mut cache = MatrixCache::new();
            let mut batch = Vec::with_capacity(chunk.len());
            for record in chunk {
                batch.push(self.prepare(record, &mut cache).await?);
            }

            self.sink.emit(DiagnosticEvent::progress(
                COMPONENT,
                format!("Submitting {} records", batch.len()),
            ));
            self.command.submit(&batch).await.context("Failed to submit records")?;
            summary.submitted += batch.len();
            summary.batches += 1;
        }

        let deletes = all
            .iter()
            .filter(|r| r.is_deleted)
            .map(|r| {
                Ok(DeleteRecord {
                    location: r.reporting_point.full_name.clone(),
                    module: module_of(r)?,
                    set_id: r.id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for chunk in batches(&deletes, self.options.batch_size) {
            self.sink.emit(DiagnosticEvent::progress(
                COMPONENT,
                format!("Deleting {} records", chunk.len()),
            ));
            self.command.delete(chunk).await.context("Failed to delete records")?;
            summary.deleted += chunk.len();
            summary.batches += 1;
        }

        let confirms = all
            .iter()
            .filter(|r| r.is_confirmed)
            .map(|r| {
                Ok(ConfirmRecord {
                    location: r.reporting_point.full_name.clone(),
                    module: module_of(r)?,
                    set_id: r.id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for chunk in batches(&confirms, self.options.batch_size) {
            self.sink.emit(DiagnosticEvent::progress(
                COMPONENT,
                format!("Confirming {} records", chunk.len()),
            ));
            self.command.confirm(chunk).await.context("Failed to confirm records")?;
            summary.confirmed += chunk.len();
            summary.batches += 1;
        }

        Ok(summary)
    }

    async fn prepare(&self, record: &ReportingPointRecord, cache: &mut MatrixCache) -> Result<SubmitRecord> {
        let translator = FieldTranslator::new(&self.options.translation, self.sink);
        let resolver = CodeResolver::new(self.query, &self.options.resolver, self.sink);

        let mut fields = translator.translate(record);
        resolver
            .resolve(record.id, &record.reporting_point, &mut fields, cache)
            .await?;

        Ok(SubmitRecord {
            location: record.reporting_point.full_name.clone(),
            module: module_of(record)?,
            set_id: record.id,
            fields,
        })
    }
}
