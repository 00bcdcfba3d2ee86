// Header + cell grid shared by the CSV and workbook loaders, and the
// projection of that grid onto reconciliation rows.

use serde_json::{Map, Number, Value};
use tally_recon::config::ColumnMapping;
use tally_recon::Row;

use crate::error::IoError;

/// A parsed sheet: one header row, then data rows of typed cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Split a raw grid at its first non-empty row, which becomes the header.
    pub fn from_grid(name: &str, grid: Vec<Vec<Value>>) -> Result<Self, IoError> {
        let mut grid = grid.into_iter().skip_while(|row| row_is_blank(row));
        let header_row = grid.next().ok_or_else(|| IoError::NoHeader(name.to_string()))?;
        let headers = header_row.iter().map(header_text).collect();
        let rows = grid.filter(|row| !row_is_blank(row)).collect();
        Ok(Self { headers, rows })
    }

    /// Project onto rows keyed by the canonical `id`/`reference`/`amount` names.
    ///
    /// Columns other than the mapped three are kept only when
    /// `keep_extra_columns` is set, and never when they would shadow a
    /// canonical name.
    pub fn into_rows(
        self,
        columns: &ColumnMapping,
        keep_extra_columns: bool,
    ) -> Result<Vec<Row>, IoError> {
        let mut required = Vec::with_capacity(3);
        for (source, canonical) in columns.pairs() {
            let idx = self
                .headers
                .iter()
                .position(|h| h == source)
                .ok_or_else(|| IoError::MissingColumn {
                    source_name: "spreadsheet",
                    column: source.to_string(),
                })?;
            required.push((idx, canonical));
        }

        let extras: Vec<(usize, &str)> = if keep_extra_columns {
            self.headers
                .iter()
                .enumerate()
                .filter(|(i, h)| {
                    !h.is_empty()
                        && required.iter().all(|(ri, canonical)| ri != i && canonical != h)
                })
                .map(|(i, h)| (i, h.as_str()))
                .collect()
        } else {
            Vec::new()
        };

        let rows = self
            .rows
            .iter()
            .map(|cells| {
                let cell = |i: usize| cells.get(i).cloned().unwrap_or(Value::Null);
                let mut row = Map::new();
                for (idx, canonical) in &required {
                    row.insert((*canonical).to_string(), cell(*idx));
                }
                for (idx, name) in &extras {
                    row.insert((*name).to_string(), cell(*idx));
                }
                row
            })
            .collect();

        Ok(rows)
    }
}

fn row_is_blank(row: &[Value]) -> bool {
    row.iter().all(|v| match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

fn header_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Integral floats become integers; non-finite values have no JSON form.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(v: Value) -> Vec<Vec<Value>> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_array().unwrap().clone())
            .collect()
    }

    #[test]
    fn header_is_first_non_blank_row() {
        let table = Table::from_grid(
            "t",
            grid(json!([
                [null, ""],
                ["id", " reference ", "amount"],
                [1, "A", 10],
                [null, null, null],
                [2, "B", 20]
            ])),
        )
        .unwrap();
        assert_eq!(table.headers, vec!["id", "reference", "amount"]);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn empty_grid_has_no_header() {
        let err = Table::from_grid("upload.csv", vec![]).unwrap_err();
        assert_eq!(err.to_string(), "upload.csv contains no header row");
    }

    #[test]
    fn projection_keeps_only_required_by_default() {
        let table = Table::from_grid(
            "t",
            grid(json!([["memo", "amount", "id", "reference"], ["x", 5, 1, "A"]])),
        )
        .unwrap();
        let rows = table.into_rows(&ColumnMapping::default(), false).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0]["amount"], json!(5));
    }

    #[test]
    fn projection_renames_and_keeps_extras() {
        let columns = ColumnMapping {
            id: "Txn".into(),
            reference: "Ref".into(),
            amount: "Total".into(),
        };
        let table = Table::from_grid(
            "t",
            grid(json!([["Txn", "Ref", "Total", "memo", "id"], [1, "A", 5, "x", 99]])),
        )
        .unwrap();
        let rows = table.into_rows(&columns, true).unwrap();
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[0]["reference"], json!("A"));
        assert_eq!(rows[0]["memo"], json!("x"));
        assert!(!rows[0].contains_key("Txn"));
    }

    #[test]
    fn short_rows_pad_with_null() {
        let table = Table::from_grid("t", grid(json!([["id", "reference", "amount"], [1, "A"]])))
            .unwrap();
        let rows = table.into_rows(&ColumnMapping::default(), false).unwrap();
        assert_eq!(rows[0]["amount"], Value::Null);
    }

    #[test]
    fn missing_column_is_named() {
        let table = Table::from_grid("t", grid(json!([["id", "amount"], [1, 5]]))).unwrap();
        let err = table.into_rows(&ColumnMapping::default(), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "spreadsheet data is missing required column 'reference'"
        );
    }

    #[test]
    fn number_value_normalizes_integral_floats() {
        assert_eq!(number_value(100.0), json!(100));
        assert_eq!(number_value(12.5), json!(12.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
    }
}
