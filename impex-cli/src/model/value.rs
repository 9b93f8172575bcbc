//! Typed field values carried by reporting point records

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::FieldType;

/// Date-time layout the plant service expects on submission
const SUBMIT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Date-time layout written into spreadsheet cells
const CELL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Naive layouts accepted from spreadsheet cells (interpreted as local time)
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// A value of one reporting point field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    Bool(bool),
    String(String),
    DateTime(DateTime<Utc>),
    Int(i64),
    Double(f64),
}

/// Raw text could not be converted to the field's type
#[derive(Debug, Clone, PartialEq)]
pub struct ValueError {
    pub text: String,
    pub field_type: FieldType,
}

impl std::fmt::Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unable to interpret '{}' as {:?}", self.text, self.field_type)
    }
}

impl std::error::Error for ValueError {}

impl FieldValue {
    /// Convert raw cell text into a typed value. Blank text yields `None`.
    pub fn parse(text: &str, field_type: FieldType) -> Result<Option<Self>, ValueError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let err = || ValueError {
            text: trimmed.to_string(),
            field_type,
        };

        let value = match field_type {
            FieldType::String => FieldValue::String(text.to_string()),
            FieldType::Boolean => FieldValue::Bool(parse_bool(trimmed).ok_or_else(err)?),
            FieldType::Integer => FieldValue::Int(trimmed.parse().map_err(|_| err())?),
            FieldType::Double => FieldValue::Double(trimmed.parse().map_err(|_| err())?),
            FieldType::DateTime => FieldValue::DateTime(parse_datetime(trimmed).ok_or_else(err)?),
        };

        Ok(Some(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text sent to the plant service
    pub fn to_submit_text(&self) -> String {
        match self {
            FieldValue::Bool(true) => "True".to_string(),
            FieldValue::Bool(false) => "False".to_string(),
            FieldValue::DateTime(dt) => dt.format(SUBMIT_DATETIME_FORMAT).to_string(),
            other => other.to_string(),
        }
    }

    /// Text written into a spreadsheet cell (date-times in local time)
    pub fn to_cell_text(&self) -> String {
        match self {
            FieldValue::DateTime(dt) => dt.with_timezone(&Local).format(CELL_DATETIME_FORMAT).to_string(),
            other => other.to_string(),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" => return Some(true),
        "false" => return Some(false),
        _ => {}
    }
    text.parse::<i64>().ok().map(|i| i != 0)
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Double(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(d: f64) -> Self {
        FieldValue::Double(d)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_no_value() {
        assert_eq!(FieldValue::parse("   ", FieldType::Integer).unwrap(), None);
        assert_eq!(FieldValue::parse("", FieldType::String).unwrap(), None);
    }

    #[test]
    fn test_parse_bool_accepts_words_and_numbers() {
        assert_eq!(FieldValue::parse("TRUE", FieldType::Boolean).unwrap(), Some(FieldValue::Bool(true)));
        assert_eq!(FieldValue::parse("0", FieldType::Boolean).unwrap(), Some(FieldValue::Bool(false)));
        assert_eq!(FieldValue::parse("2", FieldType::Boolean).unwrap(), Some(FieldValue::Bool(true)));
        assert!(FieldValue::parse("maybe", FieldType::Boolean).is_err());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(FieldValue::parse("42", FieldType::Integer).unwrap(), Some(FieldValue::Int(42)));
        assert_eq!(FieldValue::parse("1.5", FieldType::Double).unwrap(), Some(FieldValue::Double(1.5)));
        assert!(FieldValue::parse("1.5", FieldType::Integer).is_err());
    }

    #[test]
    fn test_parse_rfc3339_datetime() {
        let value = FieldValue::parse("2024-03-01T06:30:00Z", FieldType::DateTime)
            .unwrap()
            .unwrap();
        assert_eq!(value.to_submit_text(), "2024-03-01T06:30:00Z");
    }

    #[test]
    fn test_naive_datetime_round_trips_through_cell_text() {
        let value = FieldValue::parse("2024-03-01 06:30:00", FieldType::DateTime)
            .unwrap()
            .unwrap();
        assert_eq!(value.to_cell_text(), "2024-03-01 06:30:00");
    }

    #[test]
    fn test_submit_text_for_bool() {
        assert_eq!(FieldValue::Bool(true).to_submit_text(), "True");
        assert_eq!(FieldValue::Bool(false).to_submit_text(), "False");
        assert_eq!(FieldValue::Int(7).to_submit_text(), "7");
    }

    #[test]
    fn test_string_keeps_surrounding_text() {
        assert_eq!(
            FieldValue::parse(" Conveyor 1 ", FieldType::String).unwrap(),
            Some(FieldValue::String(" Conveyor 1 ".to_string()))
        );
    }
}
