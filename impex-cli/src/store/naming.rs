//! By-asset naming: which workbook and sheet a reporting point is written to

use super::layout::MAX_SHEET_NAME_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileParts {
    /// Workbook name without extension
    pub file_name: String,
    pub sheet_name: String,
}

/// Split a full name into workbook and sheet parts.
///
/// All but the last two path segments name the workbook (joined by spaces);
/// the last two, concatenated without spaces, name the sheet. Names with two
/// segments or fewer have no asset part and use the sheet name for the
/// workbook too.
pub fn file_parts(full_name: &str) -> FileParts {
    let parts: Vec<&str> = full_name.split('.').collect();
    let split = parts.len().saturating_sub(2);

    let sheet_name: String = parts[split..].concat().replace(' ', "");
    let sheet_name = sheet_name.chars().take(MAX_SHEET_NAME_LEN).collect::<String>();

    let file_name = if split == 0 {
        sheet_name.clone()
    } else {
        parts[..split].join(" ")
    };

    FileParts { file_name, sheet_name }
}
