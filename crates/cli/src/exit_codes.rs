//! CLI Exit Code Registry
//!
//! Single source of truth for `tally` exit codes. Scripts and CI jobs rely on
//! them, so existing values never change meaning.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success, every record reconciled                     |
//! | 1    | Run completed but unreconciled rows remain           |
//! | 2    | CLI usage error (bad arguments)                      |
//! | 3    | Config file failed to parse or validate              |
//! | 4    | Input data rejected (missing column, schema, empty)  |
//! | 5    | Runtime failure (unreadable file, write error)       |

use tally_io::IoError;
use tally_recon::ReconError;

/// Success: command completed and nothing is left unreconciled.
pub const EXIT_SUCCESS: u8 = 0;

/// The run finished but produced unreconciled rows. Like `diff(1)`, 1 means
/// "the sources differ".
pub const EXIT_UNRECONCILED: u8 = 1;

/// Usage error. clap exits with this code on its own for argument errors.
pub const EXIT_USAGE: u8 = 2;

/// Config TOML could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// One of the sources is malformed: missing column, bad cell, empty
/// reference, duplicate key under the `reject` policy.
pub const EXIT_INPUT: u8 = 4;

/// Filesystem or encoding failure outside the data itself.
pub const EXIT_RUNTIME: u8 = 5;

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        e if e.is_input_error() => EXIT_INPUT,
        _ => EXIT_RUNTIME,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    if err.is_input_error() {
        EXIT_INPUT
    } else {
        EXIT_RUNTIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_recon::model::Side;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_UNRECONCILED,
            EXIT_USAGE,
            EXIT_INVALID_CONFIG,
            EXIT_INPUT,
            EXIT_RUNTIME,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn recon_errors_map_to_codes() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::EmptyInput { side: Side::Reference }),
            EXIT_INPUT
        );
    }

    #[test]
    fn io_errors_map_to_codes() {
        assert_eq!(io_exit_code(&IoError::SheetNotFound("March".into())), EXIT_INPUT);
        let read = IoError::Read {
            path: "x.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io_exit_code(&read), EXIT_RUNTIME);
    }
}
