//! Reporting point field metadata and the id/display-name index

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Value type of a reporting point field; the plant service's "xs:" names are accepted too
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(alias = "xs:Boolean")]
    Boolean,
    #[serde(alias = "xs:String")]
    String,
    #[serde(alias = "xs:DateTime")]
    DateTime,
    #[serde(alias = "xs:Int")]
    Integer,
    #[serde(alias = "xs:Double")]
    Double,
}

/// A field defined on a reporting point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingPointField {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub has_allowed_values: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    pub field_type: FieldType,
}

impl ReportingPointField {
    /// Plain writable field with no allowed-value list
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_read_only: false,
            is_mandatory: false,
            has_allowed_values: false,
            allowed_values: Vec::new(),
            field_type,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }
}

/// Fields of one reporting point, addressable by id or by display name.
///
/// Built once per reporting point. Ids and display names are each unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldIndex {
    fields: Vec<ReportingPointField>,
    by_id: HashMap<String, usize>,
    by_display_name: HashMap<String, usize>,
}

impl FieldIndex {
    pub fn new(fields: Vec<ReportingPointField>) -> Result<Self, ModelError> {
        let mut by_id = HashMap::with_capacity(fields.len());
        let mut by_display_name = HashMap::with_capacity(fields.len());

        for (idx, field) in fields.iter().enumerate() {
            if by_id.insert(field.id.clone(), idx).is_some() {
                return Err(ModelError::DuplicateField(field.id.clone()));
            }
            if by_display_name.insert(field.display_name.clone(), idx).is_some() {
                return Err(ModelError::DuplicateField(field.display_name.clone()));
            }
        }

        Ok(Self {
            fields,
            by_id,
            by_display_name,
        })
    }

    pub fn by_id(&self, id: &str) -> Option<&ReportingPointField> {
        self.by_id.get(id).map(|&idx| &self.fields[idx])
    }

    pub fn by_display_name(&self, display_name: &str) -> Option<&ReportingPointField> {
        self.by_display_name.get(display_name).map(|&idx| &self.fields[idx])
    }

    /// Resolve a record key: id first, then display name
    pub fn resolve(&self, name: &str) -> Option<&ReportingPointField> {
        self.by_id(name).or_else(|| self.by_display_name(name))
    }

    /// Fields in definition order
    pub fn iter(&self) -> impl Iterator<Item = &ReportingPointField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for FieldIndex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldIndex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<ReportingPointField>::deserialize(deserializer)?;
        FieldIndex::new(fields).map_err(serde::de::Error::custom)
    }
}
