// Loading both sides of a reconciliation and exporting its result

pub mod csv;
pub mod error;
pub mod json;
pub mod reference;
pub mod spreadsheet;
pub mod table;
pub mod xlsx;

pub use error::IoError;
pub use reference::{load_reference, parse_reference};
pub use spreadsheet::{load_spreadsheet, SpreadsheetFormat};
