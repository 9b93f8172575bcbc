//! Record values to the outgoing field list of a submission

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::model::ReportingPointRecord;

/// Fields maintained by the plant service; never submitted
pub const SYSTEM_FIELDS: &[&str] = &[
    "HasAudit",
    "CreatedBy",
    "IsManual",
    "CreatedDateTime",
    "ConfirmedBy",
    "ConfirmedDateTime",
    "IsDeleted",
    "ObjectId",
];

/// Fields the service expects under their display name
pub const DISPLAY_NAME_FIELDS: &[&str] = &[
    "StartDateTime",
    "EndDateTime",
    "Explanation",
    "PercentDowntime",
    "SampleDateTime",
];

/// A named value in a submission. `None` clears the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitField {
    pub name: String,
    pub value: Option<String>,
}

impl SubmitField {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslationOptions {
    pub excluded_fields: HashSet<String>,
    pub display_name_fields: HashSet<String>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            excluded_fields: SYSTEM_FIELDS.iter().map(|s| s.to_string()).collect(),
            display_name_fields: DISPLAY_NAME_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct FieldTranslator<'a> {
    options: &'a TranslationOptions,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> FieldTranslator<'a> {
    pub fn new(options: &'a TranslationOptions, sink: &'a dyn DiagnosticSink) -> Self {
        Self { options, sink }
    }

    /// Build the outgoing field list of a record.
    ///
    /// Keys that match no field are reported and dropped. Read-only and
    /// excluded fields are skipped silently.
    pub fn translate(&self, record: &ReportingPointRecord) -> Vec<SubmitField> {
        let rp = &record.reporting_point;
        let mut fields = Vec::with_capacity(record.values.len());

        for (key, value) in &record.values {
            let Some(field) = rp.fields.resolve(key) else {
                self.sink.emit(DiagnosticEvent::UnknownField {
                    reporting_point: rp.full_name.clone(),
                    field: key.clone(),
                    record_id: record.id,
                });
                continue;
            };

            if field.is_read_only
                || self.options.excluded_fields.contains(key)
                || self.options.excluded_fields.contains(&field.id)
            {
                continue;
            }

            let name = if self.options.display_name_fields.contains(&field.id) {
                field.display_name.clone()
            } else {
                key.clone()
            };

            fields.push(SubmitField::new(name, value.as_ref().map(|v| v.to_submit_text())));
        }

        fields
    }
}
