// Excel workbook import (xlsx, xlsm, xls, xlsb, ods) and report export (xlsx only)
//
// Import: first sheet (or a named one) becomes a header + typed cell grid.
// Export: reconciliation result as a three-sheet workbook for sharing.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use serde::Serialize;
use serde_json::Value;
use tally_recon::ReconResult;

use crate::error::IoError;
use crate::table::{number_value, Table};

/// Import one sheet of an Excel/ODS workbook.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::Workbook(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound(name.to_string()))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IoError::Workbook("workbook contains no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::Workbook(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    tracing::debug!(sheet = %sheet_name, rows = range.height(), "workbook sheet loaded");
    Table::from_grid(&format!("sheet '{sheet_name}'"), grid)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Float(n) => number_value(*n),
        Data::Int(n) => Value::from(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(e) => Value::String(format!("#{e:?}")),
        // Dates and durations keep their textual form
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Report export
// ---------------------------------------------------------------------------

/// Write the result as `Reconciled`, `Unreconciled` and `Summary` sheets.
pub fn export_report(result: &ReconResult, path: &Path) -> Result<(), IoError> {
    let mut workbook = XlsxWorkbook::new();
    let header = Format::new().set_bold();

    write_rows(workbook.add_worksheet().set_name("Reconciled")?, &result.reconciled, &header)?;
    write_rows(workbook.add_worksheet().set_name("Unreconciled")?, &result.unreconciled, &header)?;

    let summary = workbook.add_worksheet().set_name("Summary")?;
    summary.write_string_with_format(0, 0, "metric", &header)?;
    summary.write_string_with_format(0, 1, "value", &header)?;
    let summary_value = to_object(&result.summary)?;
    for (i, (name, value)) in summary_value.iter().enumerate() {
        let row = i as u32 + 1;
        summary.write_string(row, 0, name)?;
        write_cell(summary, row, 1, value)?;
    }
    let meta_row = summary_value.len() as u32 + 2;
    summary.write_string(meta_row, 0, "amount_rule")?;
    summary.write_string(meta_row, 1, &result.meta.amount_rule)?;
    summary.write_string(meta_row + 1, 0, "run_at")?;
    summary.write_string(meta_row + 1, 1, &result.meta.run_at)?;

    workbook.save(path)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

fn to_object<T: Serialize>(value: &T) -> Result<serde_json::Map<String, Value>, IoError> {
    match serde_json::to_value(value).map_err(IoError::Encode)? {
        Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

/// One header row with the union of column names in first-seen order.
fn write_rows<T: Serialize>(sheet: &mut Worksheet, rows: &[T], header: &Format) -> Result<(), IoError> {
    let objects = rows.iter().map(to_object).collect::<Result<Vec<_>, _>>()?;

    let mut columns: Vec<&str> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    for (c, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, *name, header)?;
    }
    for (r, obj) in objects.iter().enumerate() {
        for (c, name) in columns.iter().enumerate() {
            if let Some(value) = obj.get(*name) {
                write_cell(sheet, r as u32 + 1, c as u16, value)?;
            }
        }
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<(), IoError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                sheet.write_number(row, col, f)?;
            }
        }
        Value::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        other => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tally_recon::{reconcile, Record};

    fn write_fixture(path: &Path) {
        let mut wb = XlsxWorkbook::new();
        let ws = wb.add_worksheet().set_name("Upload").unwrap();
        for (c, h) in ["id", "reference", "amount", "memo"].iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        ws.write_number(1, 0, 1.0).unwrap();
        ws.write_string(1, 1, "A").unwrap();
        ws.write_number(1, 2, 100.0).unwrap();
        ws.write_string(1, 3, "rent").unwrap();
        ws.write_number(2, 0, 2.0).unwrap();
        ws.write_string(2, 1, "B").unwrap();
        ws.write_number(2, 2, 12.5).unwrap();
        wb.add_worksheet().set_name("Other").unwrap();
        wb.save(path).unwrap();
    }

    #[test]
    fn import_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.xlsx");
        write_fixture(&path);

        let table = import(&path, None).unwrap();
        assert_eq!(table.headers, vec!["id", "reference", "amount", "memo"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], json!(1));
        assert_eq!(table.rows[0][2], json!(100));
        assert_eq!(table.rows[1][2], json!(12.5));
    }

    #[test]
    fn import_named_sheet_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.xlsx");
        write_fixture(&path);

        let err = import(&path, Some("March")).unwrap_err();
        assert_eq!(err.to_string(), "sheet 'March' not found");
    }

    #[test]
    fn corrupt_workbook_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let err = import(&path, None).unwrap_err();
        assert!(matches!(err, IoError::Workbook(_)));
    }

    #[test]
    fn export_report_round_trips_through_calamine() {
        let result = reconcile(
            &[Record::new(1, "A", 100), Record::new(2, "B", 5)],
            &[Record::new(1, "A", 100), Record::new(3, "C", 7)],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        export_report(&result, &path).unwrap();

        let mut wb: Sheets<_> = open_workbook_auto(&path).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Reconciled", "Unreconciled", "Summary"]);

        let unreconciled = import(&path, Some("Unreconciled")).unwrap();
        assert!(unreconciled.headers.contains(&"mismatch_reason".to_string()));
        assert_eq!(unreconciled.rows.len(), 2);

        let reconciled = wb.worksheet_range("Reconciled").unwrap();
        assert_eq!(reconciled.height(), 2);
    }
}
