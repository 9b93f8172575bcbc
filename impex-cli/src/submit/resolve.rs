//! Replace cause / classification / effect text with relationship matrix codes

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::SubmitField;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::matrix::RelationshipMatrix;
use crate::model::{ReportingPoint, ReportingPointId};
use crate::service::QueryService;

/// Names of the fields the resolver works on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverFields {
    pub cause_location: String,
    pub cause: String,
    pub classification: String,
    pub effect: String,
}

impl Default for ResolverFields {
    fn default() -> Self {
        Self {
            cause_location: "Cause Location".to_string(),
            cause: "Cause".to_string(),
            classification: "Classification".to_string(),
            effect: "Effect".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CodeKind {
    Cause,
    Classification,
    Effect,
}

impl CodeKind {
    fn field_name(self, fields: &ResolverFields) -> &str {
        match self {
            CodeKind::Cause => &fields.cause,
            CodeKind::Classification => &fields.classification,
            CodeKind::Effect => &fields.effect,
        }
    }

    fn lookup(self, matrix: &RelationshipMatrix, name: &str) -> Option<String> {
        match self {
            CodeKind::Cause => matrix.cause_code(name).map(|c| c.to_string()),
            CodeKind::Classification => matrix.classification_code(name).map(|c| c.to_string()),
            CodeKind::Effect => matrix.effect_code(name).map(str::to_string),
        }
    }
}

/// Matrices fetched during one submission batch
#[derive(Debug, Default)]
pub struct MatrixCache {
    matrices: HashMap<(ReportingPointId, String), Arc<RelationshipMatrix>>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

pub struct CodeResolver<'a> {
    query: &'a dyn QueryService,
    fields: &'a ResolverFields,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> CodeResolver<'a> {
    pub fn new(query: &'a dyn QueryService, fields: &'a ResolverFields, sink: &'a dyn DiagnosticSink) -> Self {
        Self { query, fields, sink }
    }

    /// Resolve the coded fields of one record in place.
    ///
    /// Without a cause location all four fields are removed. Lookup misses
    /// are reported and the field removed; only a failed matrix fetch is an
    /// error. The matrix is fetched only when a field needs it.
    pub async fn resolve(
        &self,
        record_id: i64,
        reporting_point: &ReportingPoint,
        fields: &mut Vec<SubmitField>,
        cache: &mut MatrixCache,
    ) -> Result<()> {
        let cause_location = fields
            .iter()
            .find(|f| f.name == self.fields.cause_location)
            .and_then(|f| f.value.clone())
            .filter(|v| !v.trim().is_empty());

        let Some(cause_location) = cause_location else {
            let names = [
                &self.fields.cause_location,
                &self.fields.cause,
                &self.fields.classification,
                &self.fields.effect,
            ];
            fields.retain(|f| !names.contains(&&f.name));
            return Ok(());
        };

        let mut matrix: Option<Arc<RelationshipMatrix>> = None;

        for kind in [CodeKind::Cause, CodeKind::Classification, CodeKind::Effect] {
            let name = kind.field_name(self.fields);
            let Some(pos) = fields.iter().position(|f| f.name == name) else {
                continue;
            };

            let text = match fields[pos].value.as_deref() {
                Some(text) if !text.trim().is_empty() => text.to_string(),
                _ => {
                    fields.remove(pos);
                    continue;
                }
            };

            let current = match &matrix {
                Some(m) => Arc::clone(m),
                None => {
                    let fetched = self.matrix_for(reporting_point, &cause_location, cache).await?;
                    matrix = Some(Arc::clone(&fetched));
                    fetched
                }
            };

            match kind.lookup(&current, &text) {
                Some(code) => fields[pos].value = Some(code),
                None => {
                    self.sink.emit(DiagnosticEvent::UnresolvedCode {
                        record_id,
                        field: name.to_string(),
                        value: text,
                        reporting_point: reporting_point.full_name.clone(),
                        cause_location: cause_location.clone(),
                    });
                    fields.remove(pos);
                }
            }
        }

        Ok(())
    }

    async fn matrix_for(
        &self,
        reporting_point: &ReportingPoint,
        cause_location: &str,
        cache: &mut MatrixCache,
    ) -> Result<Arc<RelationshipMatrix>> {
        let key = (reporting_point.id(), cause_location.to_string());
        if let Some(matrix) = cache.matrices.get(&key) {
            return Ok(Arc::clone(matrix));
        }

        log::debug!(
            "Fetching relationship matrix for '{}' at cause location '{}'",
            reporting_point,
            cause_location
        );

        let matrix = Arc::new(
            self.query
                .relationship_matrix(reporting_point, cause_location)
                .await
                .with_context(|| {
                    format!(
                        "Failed to fetch relationship matrix for '{}' at cause location '{}'",
                        reporting_point, cause_location
                    )
                })?,
        );
        cache.matrices.insert(key, Arc::clone(&matrix));
        Ok(matrix)
    }
}
