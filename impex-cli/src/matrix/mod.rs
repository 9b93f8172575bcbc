//! Relationship matrix: cause / classification / effect text to codes
//!
//! A matrix is scoped to one cause location. It maps display names to codes
//! (last write wins per name) and lists the valid code combinations. Adding a
//! combination whose code is not already mapped is a contract violation: the
//! data came from the plant service and is internally inconsistent.

mod values;

pub use values::{MatrixValue, MatrixValueRow};

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A valid combination of codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipMatrixEntry {
    pub cause_code: Option<i32>,
    pub classification_code: Option<i32>,
    pub effect_code: Option<String>,
}

/// An entry references a code missing from the matrix's name tables
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixError {
    UnknownCauseCode(i32),
    UnknownClassificationCode(i32),
    UnknownEffectCode(String),
    /// The service sent a non-numeric cause or classification id
    InvalidCode { field: String, id: String },
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::UnknownCauseCode(code) => {
                write!(f, "Relationship matrix entry references unknown cause code {}", code)
            }
            MatrixError::UnknownClassificationCode(code) => write!(
                f,
                "Relationship matrix entry references unknown classification code {}",
                code
            ),
            MatrixError::UnknownEffectCode(code) => {
                write!(f, "Relationship matrix entry references unknown effect code '{}'", code)
            }
            MatrixError::InvalidCode { field, id } => {
                write!(f, "Relationship matrix {} id '{}' is not numeric", field, id)
            }
        }
    }
}

impl std::error::Error for MatrixError {}

/// Name to code table that also answers "is this code mapped" in constant time
#[derive(Debug, Clone, PartialEq)]
struct CodeTable<C>
where
    C: Eq + Hash,
{
    by_name: HashMap<String, C>,
    /// Number of names currently mapped to each code
    names_per_code: HashMap<C, usize>,
}

impl<C: Eq + Hash> Default for CodeTable<C> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            names_per_code: HashMap::new(),
        }
    }
}

impl<C: Clone + Eq + Hash> CodeTable<C> {
    /// Last write wins per name
    fn upsert(&mut self, name: String, code: C) {
        *self.names_per_code.entry(code.clone()).or_insert(0) += 1;
        if let Some(old) = self.by_name.insert(name, code) {
            if let Some(count) = self.names_per_code.get_mut(&old) {
                *count -= 1;
                if *count == 0 {
                    self.names_per_code.remove(&old);
                }
            }
        }
    }

    fn code(&self, name: &str) -> Option<&C> {
        self.by_name.get(name)
    }

    fn contains(&self, code: &C) -> bool {
        self.names_per_code.contains_key(code)
    }
}

/// Code lookup for one cause location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipMatrix {
    cause_location: String,
    causes: CodeTable<i32>,
    classifications: CodeTable<i32>,
    effects: CodeTable<String>,
    entries: Vec<RelationshipMatrixEntry>,
}

impl RelationshipMatrix {
    pub fn new(cause_location: impl Into<String>) -> Self {
        Self {
            cause_location: cause_location.into(),
            ..Default::default()
        }
    }

    pub fn cause_location(&self) -> &str {
        &self.cause_location
    }

    pub fn entries(&self) -> &[RelationshipMatrixEntry] {
        &self.entries
    }

    pub fn upsert_cause(&mut self, code: i32, name: impl Into<String>) {
        self.causes.upsert(name.into(), code);
    }

    pub fn upsert_classification(&mut self, code: i32, name: impl Into<String>) {
        self.classifications.upsert(name.into(), code);
    }

    pub fn upsert_effect(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.effects.upsert(name.into(), code.into());
    }

    /// Record a valid combination. Every code must already be mapped.
    pub fn add_entry(
        &mut self,
        cause_code: Option<i32>,
        classification_code: Option<i32>,
        effect_code: Option<String>,
    ) -> Result<(), MatrixError> {
        if let Some(code) = cause_code {
            if !self.causes.contains(&code) {
                return Err(MatrixError::UnknownCauseCode(code));
            }
        }

        if let Some(code) = classification_code {
            if !self.classifications.contains(&code) {
                return Err(MatrixError::UnknownClassificationCode(code));
            }
        }

        // Blank effect codes carry no combination constraint
        let effect_code = effect_code.filter(|c| !c.trim().is_empty());
        if let Some(code) = &effect_code {
            if !self.effects.contains(code) {
                return Err(MatrixError::UnknownEffectCode(code.clone()));
            }
        }

        self.entries.push(RelationshipMatrixEntry {
            cause_code,
            classification_code,
            effect_code,
        });
        Ok(())
    }

    pub fn cause_code(&self, name: &str) -> Option<i32> {
        self.causes.code(name).copied()
    }

    pub fn classification_code(&self, name: &str) -> Option<i32> {
        self.classifications.code(name).copied()
    }

    pub fn effect_code(&self, name: &str) -> Option<&str> {
        self.effects.code(name).map(String::as_str)
    }

    /// Whether this combination was listed by the service
    pub fn allows(&self, cause: Option<i32>, classification: Option<i32>) -> bool {
        self.entries
            .iter()
            .any(|e| e.cause_code == cause && e.classification_code == classification)
    }
}
