//! Reporting point records in xlsx workbooks, one sheet per reporting point

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, TimeDelta};
use rust_xlsxwriter::{Workbook, Worksheet};

use super::catalog::ReportingPointCatalog;
use super::layout::*;
use super::naming::file_parts;
use super::DataStore;
use crate::model::{
    FieldType, FieldValue, RecordGroup, RecordStore, ReportingPoint, ReportingPointField,
    ReportingPointRecord,
};

/// Reads and writes the reporting point sheet layout
pub struct XlsxStore {
    catalog: Arc<dyn ReportingPointCatalog>,
}

impl XlsxStore {
    pub fn new(catalog: Arc<dyn ReportingPointCatalog>) -> Self {
        Self { catalog }
    }

    fn read_sheet(&self, sheet_name: &str, range: &Range<Data>) -> Result<RecordGroup> {
        let module = cell_text(range, MODULE_ROW, VALUE_COL as u32);
        let full_name = cell_text(range, REPORTING_POINT_ROW, VALUE_COL as u32);
        if full_name.trim().is_empty() {
            bail!("Sheet '{}' does not name a reporting point", sheet_name);
        }

        let last_col = range.end().map(|(_, c)| c).unwrap_or(0);
        let last_row = range.end().map(|(r, _)| r).unwrap_or(0);

        let mut headers = Vec::new();
        for col in FIRST_FIELD_COL as u32..=last_col {
            let header = cell_text(range, HEADER_ROW, col);
            if header.trim().is_empty() {
                break;
            }
            headers.push(header);
        }

        let reporting_point = Arc::new(
            self.catalog
                .lookup(full_name.trim(), module.trim(), &headers)
                .with_context(|| format!("Failed to look up reporting point for sheet '{}'", sheet_name))?,
        );

        let mut columns: Vec<(u32, &ReportingPointField)> = Vec::with_capacity(headers.len());
        for (offset, header) in headers.iter().enumerate() {
            let field = reporting_point.fields.resolve(header).with_context(|| {
                format!(
                    "Column '{}' in sheet '{}' does not match a field of '{}'",
                    header, sheet_name, reporting_point
                )
            })?;
            columns.push((FIRST_FIELD_COL as u32 + offset as u32, field));
        }

        let mut records = Vec::new();
        for row in FIRST_DATA_ROW..=last_row {
            let id_text = cell_text(range, row, ID_COL as u32);
            let confirmed_text = cell_text(range, row, CONFIRMED_COL as u32);
            let deleted_text = cell_text(range, row, DELETED_COL as u32);

            let mut row_empty = [&id_text, &confirmed_text, &deleted_text]
                .iter()
                .all(|t| t.trim().is_empty());

            let mut record = ReportingPointRecord::new(Arc::clone(&reporting_point), parse_id(&id_text, sheet_name, row)?);
            record.is_confirmed = parse_flag(&confirmed_text, sheet_name, row)?;
            record.is_deleted = parse_flag(&deleted_text, sheet_name, row)?;

            for (col, field) in &columns {
                let text = cell_text(range, row, *col);
                let value = FieldValue::parse(&text, field.field_type).with_context(|| {
                    format!("Sheet '{}' row {} field '{}'", sheet_name, row + 1, field.display_name)
                })?;
                if value.is_some() {
                    row_empty = false;
                }
                record.values.insert(field.id.clone(), value);
            }

            if row_empty {
                break;
            }
            records.push(record);
        }

        log::debug!(
            "Read {} records for '{}' from sheet '{}'",
            records.len(),
            reporting_point,
            sheet_name
        );

        Ok(RecordGroup::new(reporting_point, records))
    }

    /// Replace (or add) one sheet of the workbook at `path`, keeping the others
    pub fn write_named_sheet(
        &self,
        path: &Path,
        sheet_name: &str,
        reporting_point: &ReportingPoint,
        records: &[ReportingPointRecord],
    ) -> Result<()> {
        let existing = if path.exists() {
            read_cells(path)?
        } else {
            Vec::new()
        };

        let mut workbook = Workbook::new();

        for sheet in existing.iter().filter(|s| s.name != sheet_name) {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for (row, col, cell) in &sheet.cells {
                copy_cell(worksheet, *row, *col, cell)?;
            }
        }

        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet_name)
            .with_context(|| format!("Invalid sheet name '{}'", sheet_name))?;
        write_reporting_point(worksheet, reporting_point, records)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        workbook
            .save(path)
            .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

        log::info!(
            "Wrote {} records for '{}' to sheet '{}' of {}",
            records.len(),
            reporting_point,
            sheet_name,
            path.display()
        );

        Ok(())
    }
}

impl DataStore for XlsxStore {
    fn read_file(&self, path: &Path) -> Result<RecordStore> {
        let mut store = RecordStore::new();

        if !path.exists() {
            log::warn!("Unable to find file '{}'", path.display());
            return Ok(store);
        }

        log::info!("Importing file '{}'", path.display());

        let mut workbook: Xlsx<_> = open_workbook(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        for sheet_name in workbook.sheet_names() {
            log::info!("Importing sheet '{}'", sheet_name);

            let range = workbook
                .worksheet_range(&sheet_name)
                .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

            store.push_group(self.read_sheet(&sheet_name, &range)?);
        }

        Ok(store)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<ReportingPointRecord>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx")))
            .collect();
        files.sort();

        let mut records = Vec::new();
        for file in files {
            records.extend(self.read_file(&file)?.into_groups().into_iter().flat_map(|g| g.records));
        }
        Ok(records)
    }

    fn write_sheet(&self, path: &Path, reporting_point: &ReportingPoint, records: &[ReportingPointRecord]) -> Result<()> {
        let parts = file_parts(&reporting_point.full_name);
        self.write_named_sheet(path, &parts.sheet_name, reporting_point, records)
    }

    fn write_records(&self, output_dir: &Path, records: &RecordStore) -> Result<()> {
        for group in records.groups() {
            let parts = file_parts(group.full_name());
            let path = output_dir.join(format!("{}.xlsx", parts.file_name));
            self.write_named_sheet(&path, &parts.sheet_name, &group.reporting_point, &group.records)?;
        }
        Ok(())
    }
}

fn write_reporting_point(
    worksheet: &mut Worksheet,
    reporting_point: &ReportingPoint,
    records: &[ReportingPointRecord],
) -> Result<()> {
    worksheet.write_string(MODULE_ROW, LABEL_COL, MODULE_LABEL)?;
    worksheet.write_string(MODULE_ROW, VALUE_COL, &reporting_point.module)?;
    worksheet.write_string(REPORTING_POINT_ROW, LABEL_COL, REPORTING_POINT_LABEL)?;
    worksheet.write_string(REPORTING_POINT_ROW, VALUE_COL, &reporting_point.full_name)?;

    worksheet.write_string(HEADER_ROW, ID_COL, ID_HEADER)?;
    worksheet.write_string(HEADER_ROW, CONFIRMED_COL, CONFIRMED_HEADER)?;
    worksheet.write_string(HEADER_ROW, DELETED_COL, DELETED_HEADER)?;

    let fields = sheet_fields(reporting_point);
    let mut by_id: HashMap<&str, u16> = HashMap::new();
    let mut by_display_name: HashMap<&str, u16> = HashMap::new();

    for (offset, field) in fields.iter().enumerate() {
        let col = FIRST_FIELD_COL + offset as u16;
        by_id.insert(&field.id, col);
        by_display_name.insert(&field.display_name, col);
        worksheet.write_string(HEADER_ROW, col, &field.display_name)?;
    }

    for (offset, record) in records.iter().enumerate() {
        let row = FIRST_DATA_ROW + offset as u32;

        worksheet.write_number(row, ID_COL, record.id as f64)?;
        worksheet.write_boolean(row, CONFIRMED_COL, record.is_confirmed)?;
        worksheet.write_boolean(row, DELETED_COL, record.is_deleted)?;

        for (key, value) in &record.values {
            let Some(&col) = by_id.get(key.as_str()).or_else(|| by_display_name.get(key.as_str())) else {
                bail!(
                    "Unable to find a column for field '{}' of '{}'",
                    key,
                    reporting_point
                );
            };
            if let Some(value) = value {
                worksheet.write_string(row, col, value.to_cell_text())?;
            }
        }
    }

    Ok(())
}

/// Cells of an existing sheet, kept so the sheet survives a rewrite
struct SheetCells {
    name: String,
    cells: Vec<(u32, u16, Data)>,
}

fn read_cells(path: &Path) -> Result<Vec<SheetCells>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet: {}", name))?;
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        let cells = range
            .used_cells()
            .map(|(r, c, cell)| (start_row + r as u32, (start_col as usize + c) as u16, cell.clone()))
            .collect();

        sheets.push(SheetCells { name, cells });
    }
    Ok(sheets)
}

fn copy_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Data) -> Result<()> {
    match cell {
        Data::Empty | Data::Error(_) => {}
        Data::Int(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        Data::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Data::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        other => {
            worksheet.write_string(row, col, data_text(other))?;
        }
    }
    Ok(())
}

fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    range.get_value((row, col)).map(data_text).unwrap_or_default()
}

fn data_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_text(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Excel serial date (days since 1899-12-30) as `YYYY-MM-DD HH:MM:SS`
fn excel_serial_text(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0));
    let millis = (serial * 86_400_000.0).round() as i64;

    epoch
        .and_then(|e| e.checked_add_signed(TimeDelta::milliseconds(millis)))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| serial.to_string())
}

fn parse_id(text: &str, sheet_name: &str, row: u32) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .with_context(|| format!("Sheet '{}' row {}: '{}' is not a record id", sheet_name, row + 1, text))
}

fn parse_flag(text: &str, sheet_name: &str, row: u32) -> Result<bool> {
    let value = FieldValue::parse(text, FieldType::Boolean)
        .with_context(|| format!("Sheet '{}' row {}", sheet_name, row + 1))?;
    Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldIndex;
    use crate::store::HeaderCatalog;

    struct FixedCatalog(ReportingPoint);

    impl ReportingPointCatalog for FixedCatalog {
        fn lookup(&self, _full_name: &str, _module: &str, _headers: &[String]) -> Result<ReportingPoint> {
            Ok(self.0.clone())
        }
    }

    fn make_point() -> ReportingPoint {
        let fields = FieldIndex::new(vec![
            ReportingPointField::new("StartDateTime", "Start Time", FieldType::DateTime),
            ReportingPointField::new("Cause", "Cause", FieldType::String),
            ReportingPointField::new("Duration", "Duration", FieldType::Double),
        ])
        .unwrap();
        ReportingPoint::new("Site.Area.Crusher.Downtime", "Downtime", fields)
    }

    fn make_records(rp: &Arc<ReportingPoint>) -> Vec<ReportingPointRecord> {
        let start = FieldValue::parse("2024-03-01 06:30:00", FieldType::DateTime).unwrap().unwrap();
        let mut first = ReportingPointRecord::new(Arc::clone(rp), 42)
            .with_value("StartDateTime", start)
            .with_value("Cause", "Belt Failure")
            .with_value("Duration", 1.5);
        first.is_confirmed = true;

        let mut second = ReportingPointRecord::new(Arc::clone(rp), 0).with_value("Start Time", FieldValue::parse("2024-03-02 00:00:00", FieldType::DateTime).unwrap().unwrap());
        second.values.insert("Cause".to_string(), None);
        vec![first, second]
    }

    #[test]
    fn test_write_then_read_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let rp = Arc::new(make_point());
        let store = XlsxStore::new(Arc::new(FixedCatalog(make_point())));

        store.write_sheet(&path, &rp, &make_records(&rp)).unwrap();
        let read = store.read_file(&path).unwrap();

        assert_eq!(read.len(), 1);
        let group = read.get(&rp.id()).unwrap();
        assert_eq!(group.records.len(), 2);

        let first = &group.records[0];
        assert_eq!(first.id, 42);
        assert!(first.is_confirmed);
        assert!(!first.is_deleted);
        assert_eq!(first.value("Cause"), Some(&FieldValue::from("Belt Failure")));
        assert_eq!(first.value("Duration"), Some(&FieldValue::Double(1.5)));
        assert_eq!(first.value("StartDateTime").unwrap().to_cell_text(), "2024-03-01 06:30:00");

        let second = &group.records[1];
        assert_eq!(second.id, 0);
        assert_eq!(second.values.get("Cause"), Some(&None));
        assert!(second.value("StartDateTime").is_some());
    }

    #[test]
    fn test_rewriting_a_sheet_keeps_other_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.xlsx");
        let store = XlsxStore::new(Arc::new(HeaderCatalog));

        let crusher = Arc::new(HeaderCatalog.lookup("Site.Crusher", "Downtime", &["key".to_string()]).unwrap());
        let conveyor = Arc::new(HeaderCatalog.lookup("Site.Conveyor", "Downtime", &["key".to_string()]).unwrap());

        store
            .write_sheet(&path, &crusher, &[ReportingPointRecord::new(Arc::clone(&crusher), 1).with_value("key", "A")])
            .unwrap();
        store
            .write_sheet(&path, &conveyor, &[ReportingPointRecord::new(Arc::clone(&conveyor), 2).with_value("key", "B")])
            .unwrap();
        store
            .write_sheet(&path, &crusher, &[ReportingPointRecord::new(Arc::clone(&crusher), 3).with_value("key", "C")])
            .unwrap();

        let read = store.read_file(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read.get(&crusher.id()).unwrap().records[0].id, 3);
        assert_eq!(
            read.get(&conveyor.id()).unwrap().records[0].value("key"),
            Some(&FieldValue::from("B"))
        );
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = XlsxStore::new(Arc::new(HeaderCatalog));

        let read = store.read_file(&dir.path().join("absent.xlsx")).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_unknown_value_key_fails_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let rp = Arc::new(make_point());
        let store = XlsxStore::new(Arc::new(FixedCatalog(make_point())));
        let record = ReportingPointRecord::new(Arc::clone(&rp), 1).with_value("Nope", "x");

        assert!(store.write_sheet(&dir.path().join("out.xlsx"), &rp, &[record]).is_err());
    }

    #[test]
    fn test_write_records_by_asset_and_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = XlsxStore::new(Arc::new(HeaderCatalog));

        let headers = ["key".to_string()];
        let crusher = Arc::new(HeaderCatalog.lookup("Site.Area.Crusher.Downtime", "Downtime", &headers).unwrap());
        let mill = Arc::new(HeaderCatalog.lookup("Site.Area.Mill.Downtime", "Downtime", &headers).unwrap());
        let other = Arc::new(HeaderCatalog.lookup("Site.Port.Loader.Downtime", "Downtime", &headers).unwrap());

        let records = crate::model::group_by_reporting_point(vec![
            ReportingPointRecord::new(Arc::clone(&crusher), 1).with_value("key", "A"),
            ReportingPointRecord::new(Arc::clone(&mill), 2).with_value("key", "B"),
            ReportingPointRecord::new(Arc::clone(&other), 3).with_value("key", "C"),
        ]);

        store.write_records(dir.path(), &records).unwrap();

        assert!(dir.path().join("Site Area.xlsx").exists());
        assert!(dir.path().join("Site Port.xlsx").exists());

        let area = store.read_file(&dir.path().join("Site Area.xlsx")).unwrap();
        assert_eq!(area.len(), 2);

        let mut ids: Vec<i64> = store.read_dir(dir.path()).unwrap().iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_serial_text(45352.25), "2024-03-01 06:00:00");
        assert_eq!(excel_serial_text(1.0), "1899-12-31 00:00:00");
    }
}
