// CSV/TSV import

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::IoError;
use crate::table::{number_value, Table};

pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&display_name(path), &content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&display_name(path), &content, b'\t')
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read { path: path.to_path_buf(), source };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel-exported CSVs are commonly Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<Table, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result?;
        grid.push(record.iter().map(cell_value).collect());
    }

    Table::from_grid(name, grid)
}

/// Text cells that read as numbers become numbers; blanks become null.
/// Zero-padded codes such as `000123` stay text so they still join with the
/// same code on the reference side.
fn cell_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if has_leading_zero(trimmed) {
        return Value::String(field.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => number_value(f),
        _ => Value::String(field.to_string()),
    }
}

/// `0` followed by another digit, after an optional sign.
fn has_leading_zero(text: &str) -> bool {
    let digits = text.strip_prefix(|c| c == '-' || c == '+').unwrap_or(text).as_bytes();
    digits.first() == Some(&b'0') && digits.get(1).is_some_and(u8::is_ascii_digit)
}
