//! Leveled diagnostic events and the sinks that receive them
//!
//! Components take a `&dyn DiagnosticSink` instead of logging directly, so
//! skip/error reporting can be collected in tests and summarised by the CLI.
//! `LogSink` forwards everything to the `log` facade.

use std::sync::Mutex;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

/// Something worth reporting while merging or submitting records
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// Progress message
    Progress { component: &'static str, message: String },
    /// Detail useful when tracing a run
    Trace { component: &'static str, message: String },
    /// FROM reporting point has no counterpart in the TO set
    ReportingPointNotFound { full_name: String },
    /// FROM reporting point matches several TO reporting points
    MultipleReportingPoints { full_name: String, count: usize },
    /// Matched TO reporting point has no records
    EmptyTarget { full_name: String },
    /// FROM record has no value for the merge field
    MissingMergeKey { full_name: String, merge_field: String, record_id: i64 },
    /// Several TO records share the FROM record's merge key
    MultipleTargetRecords { full_name: String, merge_key: String, count: usize },
    /// Cause/classification/effect text not found in the relationship matrix
    UnresolvedCode {
        record_id: i64,
        field: String,
        value: String,
        reporting_point: String,
        cause_location: String,
    },
    /// A record key does not match any field on its reporting point
    UnknownField { reporting_point: String, field: String, record_id: i64 },
    /// Unrecoverable failure reported before the run stops
    Fatal { component: &'static str, message: String },
}

impl DiagnosticEvent {
    pub fn progress(component: &'static str, message: impl Into<String>) -> Self {
        DiagnosticEvent::Progress {
            component,
            message: message.into(),
        }
    }

    pub fn trace(component: &'static str, message: impl Into<String>) -> Self {
        DiagnosticEvent::Trace {
            component,
            message: message.into(),
        }
    }

    pub fn level(&self) -> Level {
        match self {
            DiagnosticEvent::Progress { .. } => Level::Info,
            DiagnosticEvent::Trace { .. } => Level::Debug,
            DiagnosticEvent::EmptyTarget { .. } | DiagnosticEvent::UnknownField { .. } => Level::Warning,
            DiagnosticEvent::ReportingPointNotFound { .. }
            | DiagnosticEvent::MultipleReportingPoints { .. }
            | DiagnosticEvent::MissingMergeKey { .. }
            | DiagnosticEvent::MultipleTargetRecords { .. }
            | DiagnosticEvent::UnresolvedCode { .. } => Level::Error,
            DiagnosticEvent::Fatal { .. } => Level::Fatal,
        }
    }

    /// Component the event originates from, used as the log target
    pub fn component(&self) -> &'static str {
        match self {
            DiagnosticEvent::Progress { component, .. }
            | DiagnosticEvent::Trace { component, .. }
            | DiagnosticEvent::Fatal { component, .. } => *component,
            DiagnosticEvent::ReportingPointNotFound { .. }
            | DiagnosticEvent::MultipleReportingPoints { .. }
            | DiagnosticEvent::EmptyTarget { .. }
            | DiagnosticEvent::MissingMergeKey { .. }
            | DiagnosticEvent::MultipleTargetRecords { .. } => "impex::merge",
            DiagnosticEvent::UnresolvedCode { .. } | DiagnosticEvent::UnknownField { .. } => "impex::submit",
        }
    }
}

impl std::fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticEvent::Progress { message, .. }
            | DiagnosticEvent::Trace { message, .. }
            | DiagnosticEvent::Fatal { message, .. } => write!(f, "{}", message),
            DiagnosticEvent::ReportingPointNotFound { full_name } => write!(
                f,
                "Unable to find Reporting Point '{}' in the TO record set. Skipping",
                full_name
            ),
            DiagnosticEvent::MultipleReportingPoints { full_name, count } => write!(
                f,
                "Found {} TO Reporting Points for '{}'. Skipping",
                count, full_name
            ),
            DiagnosticEvent::EmptyTarget { full_name } => {
                write!(f, "No TO records to merge for '{}'. Skipping", full_name)
            }
            DiagnosticEvent::MissingMergeKey {
                full_name,
                merge_field,
                record_id,
            } => write!(
                f,
                "Record {} in '{}' has no value for merge field '{}'. Skipping",
                record_id, full_name, merge_field
            ),
            DiagnosticEvent::MultipleTargetRecords {
                full_name,
                merge_key,
                count,
            } => write!(
                f,
                "Found {} TO records in '{}' for merge key '{}'. Skipping",
                count, full_name, merge_key
            ),
            DiagnosticEvent::UnresolvedCode {
                record_id,
                field,
                value,
                reporting_point,
                cause_location,
            } => write!(
                f,
                "Record {}: unable to resolve {} '{}' for Reporting Point '{}' at Cause Location '{}'. Field removed",
                record_id, field, value, reporting_point, cause_location
            ),
            DiagnosticEvent::UnknownField {
                reporting_point,
                field,
                record_id,
            } => write!(
                f,
                "Record {}: field '{}' is not defined on Reporting Point '{}'. Field removed",
                record_id, field, reporting_point
            ),
        }
    }
}

/// Receiver of diagnostic events
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, event: DiagnosticEvent) {
        let target = event.component();
        match event.level() {
            Level::Debug => log::debug!(target: target, "{}", event),
            Level::Info => log::info!(target: target, "{}", event),
            Level::Warning => log::warn!(target: target, "{}", event),
            Level::Error => log::error!(target: target, "{}", event),
            Level::Fatal => log::error!(target: target, "FATAL: {}", event),
        }
    }
}

/// Keeps every event; also forwards to an inner sink when given one
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
    forward: Option<Box<dyn DiagnosticSink>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding_to(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            forward: Some(Box::new(sink)),
        }
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events at exactly this level
    pub fn at_level(&self, level: Level) -> Vec<DiagnosticEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level() == level)
            .collect()
    }

    pub fn count_at_least(&self, level: Level) -> usize {
        self.events().iter().filter(|e| e.level() >= level).count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, event: DiagnosticEvent) {
        if let Some(forward) = &self.forward {
            forward.emit(event.clone());
        }
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
