// Tally CLI - reconcile an uploaded spreadsheet against reference records

mod exit_codes;
mod logging;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Reconcile spreadsheet transactions against reference records")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter (error, warn, info, debug, trace). RUST_LOG overrides it.
    #[arg(long, global = true, default_value = "warn", env = "TALLY_LOG_LEVEL")]
    log_level: String,

    /// Append log events to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a spreadsheet against reference records
    #[command(after_help = "\
Examples:
  tally run upload.xlsx --reference ledger.json
  tally run upload.csv --reference ledger.json --json
  tally run upload.xlsx --reference ledger.json --config recon.toml --sheet March
  tally run upload.xlsx --reference ledger.json --output result.json --report result.xlsx
  tally run upload.csv --reference ledger.json --log-file reconciliation.log --log-level info

Exit codes:
  0  every record reconciled
  1  unreconciled rows present
  3  invalid config
  4  input rejected (missing column, bad cell, empty reference)
  5  runtime failure (unreadable file, write error)")]
    Run {
        /// Uploaded spreadsheet (.xlsx, .xlsm, .xls, .xlsb, .ods, .csv, .tsv)
        spreadsheet: PathBuf,

        /// Reference records as a JSON array of objects
        #[arg(long, short = 'r')]
        reference: PathBuf,

        /// Reconciliation config (.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Sheet to read from a workbook (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Print the full result as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write an .xlsx report with Reconciled, Unreconciled and Summary sheets
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate a reconciliation config without running
    #[command(after_help = "\
Examples:
  tally validate recon.toml")]
    Validate {
        /// Path to the .toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  tally-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = logging::init_logging(&cli.log_level, cli.log_file.as_deref()).and_then(|()| {
        match cli.command {
            Commands::Run { spreadsheet, reference, config, sheet, json, output, report } => {
                recon::cmd_run(recon::RunArgs {
                    spreadsheet,
                    reference,
                    config,
                    sheet,
                    json,
                    output,
                    report,
                })
            }
            Commands::Validate { config } => recon::cmd_validate(config),
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
