//! `tally run` and `tally validate`.

use std::path::{Path, PathBuf};

use tally_io::{load_reference, load_spreadsheet, IoError};
use tally_recon::{run_rows, ReconConfig, ReconError, ReconResult, TracingObserver};

use crate::exit_codes::{io_exit_code, recon_exit_code, EXIT_RUNTIME, EXIT_UNRECONCILED};
use crate::CliError;

pub struct RunArgs {
    pub spreadsheet: PathBuf,
    pub reference: PathBuf,
    pub config: Option<PathBuf>,
    pub sheet: Option<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref(), args.sheet)?;

    let spreadsheet = load_spreadsheet(&args.spreadsheet, &config).map_err(io_err)?;
    let reference = load_reference(&args.reference, &config.columns).map_err(io_err)?;

    let result = run_rows(&config, spreadsheet, reference, &TracingObserver).map_err(recon_err)?;

    if let Some(ref path) = args.output {
        tally_io::json::export(&result, path).map_err(io_err)?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = args.report {
        tally_io::xlsx::export_report(&result, path).map_err(io_err)?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let json_str = tally_io::json::to_json_string(&result).map_err(io_err)?;
        println!("{json_str}");
    }

    print_summary(&result);

    if !result.is_fully_reconciled() {
        return Err(CliError::new(
            EXIT_UNRECONCILED,
            format!("{} unreconciled row(s)", result.unreconciled.len()),
        ));
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(config_path.as_path()), None)?;
    eprintln!(
        "valid: recon '{}' (amount: {}, duplicates: {}, columns: {} / {} / {})",
        config.name.as_deref().unwrap_or("unnamed"),
        config.amount.rule(),
        config.duplicates,
        config.columns.id,
        config.columns.reference,
        config.columns.amount,
    );
    Ok(())
}

/// Read the config file (or take the defaults) and apply CLI overrides.
fn load_config(path: Option<&Path>, sheet: Option<String>) -> Result<ReconConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            let config_str = std::fs::read_to_string(path).map_err(|e| {
                CliError::new(EXIT_RUNTIME, format!("cannot read config {}: {e}", path.display()))
            })?;
            ReconConfig::from_toml(&config_str).map_err(recon_err)?
        }
        None => ReconConfig::default(),
    };

    if sheet.is_some() {
        config.spreadsheet.sheet = sheet;
        config.validate().map_err(recon_err)?;
    }
    Ok(config)
}

fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "recon: {} spreadsheet / {} reference records: {} reconciled, {} unreconciled \
         ({} amount mismatches, {} only in spreadsheet, {} only in reference)",
        s.spreadsheet_records,
        s.reference_records,
        s.reconciled,
        s.unreconciled,
        s.amount_mismatches,
        s.only_in_spreadsheet,
        s.only_in_reference,
    );
    if s.duplicate_keys > 0 {
        eprintln!(
            "warning: {} key(s) appear more than once; their records were paired as a cross product",
            s.duplicate_keys
        );
    }
}

fn io_err(err: IoError) -> CliError {
    let hint = match &err {
        IoError::MissingColumn { .. } => {
            Some("map the column name under [columns] in the config, e.g. id = \"Txn ID\"")
        }
        IoError::SheetNotFound(_) => Some("pass --sheet with an existing sheet name"),
        IoError::UnsupportedFormat(_) => Some("supported: .xlsx .xlsm .xls .xlsb .ods .csv .tsv"),
        _ => None,
    };
    let cli_err = CliError::new(io_exit_code(&err), err.to_string());
    match hint {
        Some(hint) => cli_err.with_hint(hint),
        None => cli_err,
    }
}

fn recon_err(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::EmptyInput { .. } => {
            Some("set require_reference = false in the config to accept an empty reference")
        }
        ReconError::DuplicateKey { .. } => {
            Some("set duplicates = \"cross_product\" to pair repeated keys instead")
        }
        _ => None,
    };
    let cli_err = CliError::new(recon_exit_code(&err), err.to_string());
    match hint {
        Some(hint) => cli_err.with_hint(hint),
        None => cli_err,
    }
}
