//! Reporting points: named nodes in the plant hierarchy that own fields

use serde::{Deserialize, Serialize};

use super::FieldIndex;

/// Identity of a reporting point: full hierarchical name plus module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportingPointId {
    pub full_name: String,
    pub module: String,
}

impl std::fmt::Display for ReportingPointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name, self.module)
    }
}

/// A reporting point and its field metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingPoint {
    /// Dot-delimited path, e.g. "Site.Area.Crusher.Downtime"
    pub full_name: String,
    #[serde(default)]
    pub display_name: String,
    pub module: String,
    #[serde(default)]
    pub fields: FieldIndex,
}

impl ReportingPoint {
    pub fn new(full_name: impl Into<String>, module: impl Into<String>, fields: FieldIndex) -> Self {
        let full_name = full_name.into();
        Self {
            display_name: full_name.rsplit('.').next().unwrap_or_default().to_string(),
            full_name,
            module: module.into(),
            fields,
        }
    }

    pub fn id(&self) -> ReportingPointId {
        ReportingPointId {
            full_name: self.full_name.clone(),
            module: self.module.clone(),
        }
    }
}

impl std::fmt::Display for ReportingPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name, self.module)
    }
}
