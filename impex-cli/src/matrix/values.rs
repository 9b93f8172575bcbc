//! Building a matrix from the rows returned by the plant service

use serde::{Deserialize, Serialize};

use super::{MatrixError, RelationshipMatrix};

/// One named value inside a matrix row, e.g. `{ name: "Cause", id: "101", value: "Belt Failure" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixValue {
    pub name: String,
    pub id: String,
    pub value: String,
}

impl MatrixValue {
    pub fn new(name: impl Into<String>, id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            value: value.into(),
        }
    }
}

/// A row of related matrix values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixValueRow {
    pub values: Vec<MatrixValue>,
}

impl MatrixValueRow {
    pub fn new(values: Vec<MatrixValue>) -> Self {
        Self { values }
    }

    fn get(&self, name: &str) -> Option<&MatrixValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

fn parse_code(field: &str, value: &MatrixValue) -> Result<i32, MatrixError> {
    value.id.trim().parse().map_err(|_| MatrixError::InvalidCode {
        field: field.to_string(),
        id: value.id.clone(),
    })
}

impl RelationshipMatrix {
    /// Build a matrix from service rows.
    ///
    /// Present names are upserted first, then one entry is added per row that
    /// carries at least one code.
    pub fn from_values(
        cause_location: impl Into<String>,
        rows: &[MatrixValueRow],
    ) -> Result<Self, MatrixError> {
        let mut matrix = RelationshipMatrix::new(cause_location);

        for row in rows {
            let cause = match row.get("Cause") {
                Some(v) => {
                    let code = parse_code("Cause", v)?;
                    matrix.upsert_cause(code, v.value.clone());
                    Some(code)
                }
                None => None,
            };

            let classification = match row.get("Classification") {
                Some(v) => {
                    let code = parse_code("Classification", v)?;
                    matrix.upsert_classification(code, v.value.clone());
                    Some(code)
                }
                None => None,
            };

            // A blank effect id maps nothing
            let effect = row.get("Effect").filter(|v| !v.id.trim().is_empty()).map(|v| {
                matrix.upsert_effect(v.id.clone(), v.value.clone());
                v.id.clone()
            });

            if cause.is_some() || classification.is_some() || effect.is_some() {
                matrix.add_entry(cause, classification, effect)?;
            }
        }

        Ok(matrix)
    }
}
