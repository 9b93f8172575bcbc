//! Cell positions of the reporting point sheet layout (zero-based)

use crate::model::{ReportingPoint, ReportingPointField};

pub const MODULE_ROW: u32 = 0;
pub const REPORTING_POINT_ROW: u32 = 1;
pub const LABEL_COL: u16 = 0;
pub const VALUE_COL: u16 = 1;

pub const HEADER_ROW: u32 = 9;
pub const FIRST_DATA_ROW: u32 = HEADER_ROW + 1;

pub const ID_COL: u16 = 0;
pub const CONFIRMED_COL: u16 = 1;
pub const DELETED_COL: u16 = 2;
pub const FIRST_FIELD_COL: u16 = 3;

pub const MODULE_LABEL: &str = "Module";
pub const REPORTING_POINT_LABEL: &str = "Reporting Point";
pub const ID_HEADER: &str = "Id";
pub const CONFIRMED_HEADER: &str = "Confirmed";
pub const DELETED_HEADER: &str = "Deleted";

/// Sheet names are limited to 31 characters
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Fields that get their own column: everything except the fixed columns
pub fn sheet_fields(reporting_point: &ReportingPoint) -> Vec<&ReportingPointField> {
    let reserved = [ID_HEADER, CONFIRMED_HEADER, DELETED_HEADER];
    reporting_point
        .fields
        .iter()
        .filter(|f| !reserved.contains(&f.id.as_str()) && !reserved.contains(&f.display_name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldIndex, FieldType};

    #[test]
    fn test_reserved_fields_have_no_column() {
        let fields = FieldIndex::new(vec![
            ReportingPointField::new("Id", "Record Id", FieldType::Integer),
            ReportingPointField::new("IsConfirmed", "Confirmed", FieldType::Boolean),
            ReportingPointField::new("Cause", "Cause", FieldType::String),
        ])
        .unwrap();
        let rp = ReportingPoint::new("Site.Crusher", "Downtime", fields);

        let columns: Vec<&str> = sheet_fields(&rp).iter().map(|f| f.id.as_str()).collect();
        assert_eq!(columns, vec!["Cause"]);
    }
}
