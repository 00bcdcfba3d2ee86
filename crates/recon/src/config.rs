use serde::Deserialize;

use crate::compare::AmountRule;
use crate::error::ReconError;
use crate::model::{FIELD_AMOUNT, FIELD_ID, FIELD_REFERENCE};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Reject an empty reference side (the schema is read from its first record).
    #[serde(default = "default_true")]
    pub require_reference: bool,
    /// Build the two key indexes on separate threads.
    #[serde(default)]
    pub parallel_index: bool,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    #[serde(default)]
    pub amount: AmountConfig,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: None,
            require_reference: true,
            parallel_index: false,
            duplicates: DuplicatePolicy::default(),
            amount: AmountConfig::default(),
            columns: ColumnMapping::default(),
            spreadsheet: SpreadsheetConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

/// What to do when a composite key repeats within one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Emit one join row per left x right pairing sharing the key.
    #[default]
    CrossProduct,
    /// Fail the run with `ReconError::DuplicateKey`.
    Reject,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CrossProduct => write!(f, "cross_product"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

// ---------------------------------------------------------------------------
// Amount comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountMode {
    #[default]
    Exact,
    Tolerance,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmountConfig {
    #[serde(default)]
    pub mode: AmountMode,
    /// Absolute tolerance, only meaningful with `mode = "tolerance"`.
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl AmountConfig {
    pub fn rule(&self) -> AmountRule {
        match self.mode {
            AmountMode::Exact => AmountRule::Exact,
            AmountMode::Tolerance => AmountRule::Tolerance(self.tolerance.unwrap_or(0.0)),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping + spreadsheet options
// ---------------------------------------------------------------------------

/// Source column names for the three required fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_id_column")]
    pub id: String,
    #[serde(default = "default_reference_column")]
    pub reference: String,
    #[serde(default = "default_amount_column")]
    pub amount: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: default_id_column(),
            reference: default_reference_column(),
            amount: default_amount_column(),
        }
    }
}

fn default_id_column() -> String {
    FIELD_ID.into()
}

fn default_reference_column() -> String {
    FIELD_REFERENCE.into()
}

fn default_amount_column() -> String {
    FIELD_AMOUNT.into()
}

impl ColumnMapping {
    /// `(source column, canonical field)` pairs.
    pub fn pairs(&self) -> [(&str, &'static str); 3] {
        [
            (self.id.as_str(), FIELD_ID),
            (self.reference.as_str(), FIELD_REFERENCE),
            (self.amount.as_str(), FIELD_AMOUNT),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpreadsheetConfig {
    /// Worksheet to read; the first sheet when unset.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Keep columns other than id/reference/amount from the upload.
    #[serde(default)]
    pub keep_extra_columns: bool,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        match (self.amount.mode, self.amount.tolerance) {
            (AmountMode::Exact, Some(_)) => {
                return Err(ReconError::ConfigValidation(
                    "amount.tolerance requires amount.mode = \"tolerance\"".into(),
                ));
            }
            (AmountMode::Tolerance, None) => {
                return Err(ReconError::ConfigValidation(
                    "amount.mode = \"tolerance\" requires amount.tolerance".into(),
                ));
            }
            (AmountMode::Tolerance, Some(t)) if !t.is_finite() || t < 0.0 => {
                return Err(ReconError::ConfigValidation(format!(
                    "amount.tolerance must be a finite, non-negative number, got {t}"
                )));
            }
            _ => {}
        }

        let cols = self.columns.pairs();
        for (source, field) in &cols {
            if source.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
        }
        for (i, (a, _)) in cols.iter().enumerate() {
            if cols[i + 1..].iter().any(|(b, _)| a == b) {
                return Err(ReconError::ConfigValidation(format!(
                    "column '{a}' is mapped to more than one required field"
                )));
            }
        }

        if let Some(ref sheet) = self.spreadsheet.sheet {
            if sheet.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "spreadsheet.sheet must not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
