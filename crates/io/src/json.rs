// JSON export of a reconciliation result

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tally_recon::ReconResult;

use crate::error::IoError;

/// Pretty-printed JSON document: `meta`, `summary`, `reconciled`, `unreconciled`.
pub fn to_json_string(result: &ReconResult) -> Result<String, IoError> {
    serde_json::to_string_pretty(result).map_err(IoError::Encode)
}

pub fn export(result: &ReconResult, path: &Path) -> Result<(), IoError> {
    let write_err = |source| IoError::Write { path: path.to_path_buf(), source };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, result).map_err(IoError::Encode)?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    tracing::info!(path = %path.display(), "result written");
    Ok(())
}
