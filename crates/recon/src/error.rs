use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (bad tolerance, clashing column names, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// A record lacks a required field or carries a value of the wrong kind.
    #[error("{side} record {index}: field '{field}' {reason}")]
    Schema {
        side: Side,
        index: usize,
        field: String,
        reason: String,
    },

    /// A side has no records to establish the schema from.
    #[error("{side} records are empty; at least one record is required")]
    EmptyInput { side: Side },

    /// A composite key repeats within one side under the `reject` policy.
    #[error("{side} records: key {key} appears {count} times")]
    DuplicateKey { side: Side, key: String, count: usize },
}

impl ReconError {
    /// True for errors caused by the records themselves rather than the config.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::EmptyInput { .. } | Self::DuplicateKey { .. }
        )
    }
}
