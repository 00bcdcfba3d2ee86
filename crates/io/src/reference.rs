// Reference-side records supplied as a JSON array of objects (e.g. a
// database query result).

use std::path::Path;

use serde_json::Value;
use tally_recon::config::ColumnMapping;
use tally_recon::Row;

use crate::error::IoError;

/// Parse a JSON array of objects into reference rows.
///
/// The first element must carry every required column. Each element's
/// mapped columns are renamed to the canonical field names; all other fields
/// pass through unchanged. Later elements are validated by the engine.
pub fn parse_reference(json: &str, columns: &ColumnMapping) -> Result<Vec<Row>, IoError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(IoError::InvalidReference(
            "expected a JSON array of objects".into(),
        ));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(mut obj) = item else {
            return Err(IoError::InvalidReference(format!("element {i} is not an object")));
        };

        if i == 0 {
            if let Some((source, _)) = columns.pairs().into_iter().find(|(s, _)| !obj.contains_key(*s)) {
                return Err(IoError::MissingColumn {
                    source_name: "reference",
                    column: source.to_string(),
                });
            }
        }

        // Take every mapped value out before inserting any, so a mapping onto
        // another mapping's source column (or a swap) cannot clobber it.
        let taken: Vec<(&'static str, Option<Value>)> = columns
            .pairs()
            .into_iter()
            .map(|(source, canonical)| (canonical, obj.remove(source)))
            .collect();
        for (canonical, value) in taken {
            if let Some(v) = value {
                obj.insert(canonical.to_string(), v);
            }
        }
        rows.push(obj);
    }

    tracing::info!(rows = rows.len(), "reference data loaded");
    Ok(rows)
}

pub fn load_reference(path: &Path, columns: &ColumnMapping) -> Result<Vec<Row>, IoError> {
    let json = crate::csv::read_file_as_utf8(path)?;
    parse_reference(&json, columns)
}
