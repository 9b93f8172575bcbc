//! Core data model: reporting points, their fields, records and record sets

mod field;
mod record;
mod reporting_point;
mod store;
mod value;

pub use field::*;
pub use record::*;
pub use reporting_point::*;
pub use store::*;
pub use value::*;

/// Error building reporting point metadata
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A field id or display name appears twice on one reporting point
    DuplicateField(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::DuplicateField(name) => {
                write!(f, "Field '{}' is defined more than once on the reporting point", name)
            }
        }
    }
}

impl std::error::Error for ModelError {}
