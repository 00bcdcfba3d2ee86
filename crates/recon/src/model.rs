use std::fmt;

use ordered_float::OrderedFloat;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::ReconError;

/// A loosely typed row as handed over by a loader: field name to JSON value.
pub type Row = Map<String, Value>;

pub const FIELD_ID: &str = "id";
pub const FIELD_REFERENCE: &str = "reference";
pub const FIELD_AMOUNT: &str = "amount";

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// Which source set a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Spreadsheet,
    Reference,
}

impl Side {
    /// Suffix appended to colliding column names in serialized rows.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "_spreadsheet",
            Self::Reference => "_reference",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spreadsheet => write!(f, "spreadsheet"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque identifier value, compared for equality only.
///
/// Integral floats normalize to `Int` so that `1.0` read from a workbook joins
/// with `1` from the reference side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ident {
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
}

impl Ident {
    /// Convert a JSON scalar. Null, arrays and objects are not identifiers.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    n.as_f64().map(Self::from_f64)
                }
            }
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn from_f64(n: f64) -> Self {
        match integral_i64(n) {
            Some(i) => Self::Int(i),
            None => Self::Float(OrderedFloat(n)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Number::from_f64(f.0).map(Value::Number).unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(n) => write!(f, "{}", n.0),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<i64> for Ident {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Ident {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Ident {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Transaction amount with native numeric semantics: `100 == 100.0`.
#[derive(Debug, Clone, Copy)]
pub enum Amount {
    Int(i64),
    Float(f64),
}

impl Amount {
    /// Convert a JSON number. Strings are never coerced.
    pub fn from_json(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            return Some(Self::Int(i));
        }
        n.as_f64().filter(|f| f.is_finite()).map(Self::Float)
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
        }
    }

    /// Absolute difference; exact for integer pairs.
    pub fn abs_diff(&self, other: &Amount) -> f64 {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => (*a as i128 - *b as i128).unsigned_abs() as f64,
            _ => (self.as_f64() - other.as_f64()).abs(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => {
                integral_i64(*f) == Some(*i)
            }
        }
    }
}

/// `f` as an i64 when it is integral and representable; the i64 range check
/// keeps the cast exact.
fn integral_i64(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The join key: `(id, reference)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CompositeKey {
    pub id: Ident,
    pub reference: Ident,
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(id={}, reference={})", self.id, self.reference)
    }
}

/// A transaction record: typed required fields plus passthrough columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Ident,
    pub reference: Ident,
    pub amount: Amount,
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<Ident>, reference: impl Into<Ident>, amount: impl Into<Amount>) -> Self {
        Self {
            id: id.into(),
            reference: reference.into(),
            amount: amount.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> CompositeKey {
        CompositeKey {
            id: self.id.clone(),
            reference: self.reference.clone(),
        }
    }

    /// Validate a loose row and split it into required fields and passthrough.
    pub fn from_row(side: Side, index: usize, mut row: Row) -> Result<Self, ReconError> {
        let schema_err = |field: &str, reason: String| ReconError::Schema {
            side,
            index,
            field: field.to_string(),
            reason,
        };

        let id_value = row
            .remove(FIELD_ID)
            .ok_or_else(|| schema_err(FIELD_ID, "is missing".into()))?;
        let reference_value = row
            .remove(FIELD_REFERENCE)
            .ok_or_else(|| schema_err(FIELD_REFERENCE, "is missing".into()))?;
        let amount_value = row
            .remove(FIELD_AMOUNT)
            .ok_or_else(|| schema_err(FIELD_AMOUNT, "is missing".into()))?;

        let id = Ident::from_json(&id_value).ok_or_else(|| {
            schema_err(FIELD_ID, format!("must be a scalar identifier, found {id_value}"))
        })?;
        let reference = Ident::from_json(&reference_value).ok_or_else(|| {
            schema_err(FIELD_REFERENCE, format!("must be a scalar identifier, found {reference_value}"))
        })?;
        let amount = Amount::from_json(&amount_value).ok_or_else(|| {
            schema_err(FIELD_AMOUNT, format!("must be numeric, found {amount_value}"))
        })?;

        Ok(Self {
            id,
            reference,
            amount,
            extra: row,
        })
    }
}

// ---------------------------------------------------------------------------
// Join rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Both,
    LeftOnly,
    RightOnly,
}

/// One row of the full outer join. Left is the spreadsheet side.
#[derive(Debug, Clone, Copy)]
pub struct JoinRow<'a> {
    pub left: Option<&'a Record>,
    pub right: Option<&'a Record>,
    pub provenance: Provenance,
}

impl<'a> JoinRow<'a> {
    pub fn both(left: &'a Record, right: &'a Record) -> Self {
        Self { left: Some(left), right: Some(right), provenance: Provenance::Both }
    }

    pub fn left_only(left: &'a Record) -> Self {
        Self { left: Some(left), right: None, provenance: Provenance::LeftOnly }
    }

    pub fn right_only(right: &'a Record) -> Self {
        Self { left: None, right: Some(right), provenance: Provenance::RightOnly }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    AmountMismatch,
    OnlyInSpreadsheet,
    OnlyInReference,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmountMismatch => write!(f, "amount_mismatch"),
            Self::OnlyInSpreadsheet => write!(f, "only_in_spreadsheet"),
            Self::OnlyInReference => write!(f, "only_in_reference"),
        }
    }
}

/// A BOTH pairing whose amounts compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRow {
    pub spreadsheet: Record,
    pub reference: Record,
}

impl ReconciledRow {
    pub fn key(&self) -> CompositeKey {
        self.spreadsheet.key()
    }
}

/// A row that failed to reconcile, tagged with why.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreconciledRow {
    pub reason: MismatchReason,
    pub spreadsheet: Option<Record>,
    pub reference: Option<Record>,
}

impl UnreconciledRow {
    pub fn key(&self) -> Option<CompositeKey> {
        self.spreadsheet
            .as_ref()
            .or(self.reference.as_ref())
            .map(Record::key)
    }
}

/// Output column carrying the classification of an unreconciled row.
pub const FIELD_MISMATCH_REASON: &str = "mismatch_reason";

const AMOUNT_SPREADSHEET: &str = "amount_spreadsheet";
const AMOUNT_REFERENCE: &str = "amount_reference";

/// Names computed by the row layout; passthrough fields never take them.
const RESERVED_FIELDS: [&str; 5] = [
    FIELD_ID,
    FIELD_REFERENCE,
    AMOUNT_SPREADSHEET,
    AMOUNT_REFERENCE,
    FIELD_MISMATCH_REASON,
];

/// Flatten one joined pairing into an ordered JSON-like map.
///
/// Layout: `id`, `reference`, `amount_spreadsheet`, `amount_reference`, then
/// passthrough fields. A passthrough name present on both sides, or one that
/// would shadow a computed column, is emitted with a side suffix.
pub fn merged_fields(spreadsheet: Option<&Record>, reference: Option<&Record>) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(first) = spreadsheet.or(reference) else {
        return out;
    };

    out.insert(FIELD_ID.into(), first.id.to_json());
    out.insert(FIELD_REFERENCE.into(), first.reference.to_json());
    out.insert(
        AMOUNT_SPREADSHEET.into(),
        spreadsheet.map(|r| r.amount.to_json()).unwrap_or(Value::Null),
    );
    out.insert(
        AMOUNT_REFERENCE.into(),
        reference.map(|r| r.amount.to_json()).unwrap_or(Value::Null),
    );

    for (side, record, other) in [
        (Side::Spreadsheet, spreadsheet, reference),
        (Side::Reference, reference, spreadsheet),
    ] {
        let Some(record) = record else { continue };
        for (name, value) in &record.extra {
            let collides = RESERVED_FIELDS.contains(&name.as_str())
                || other.is_some_and(|o| o.extra.contains_key(name));
            let out_name = if collides {
                format!("{name}{}", side.suffix())
            } else {
                name.clone()
            };
            out.insert(out_name, value.clone());
        }
    }

    out
}

impl Serialize for ReconciledRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = merged_fields(Some(&self.spreadsheet), Some(&self.reference));
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (k, v) in &fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for UnreconciledRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = merged_fields(self.spreadsheet.as_ref(), self.reference.as_ref());
        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        for (k, v) in &fields {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry(FIELD_MISMATCH_REASON, &self.reason)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Input + Output
// ---------------------------------------------------------------------------

/// Both source sets, already validated. Owned for the duration of one run.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub spreadsheet: Vec<Record>,
    pub reference: Vec<Record>,
}

impl ReconInput {
    /// Validate every row of both sides before any indexing happens.
    pub fn from_rows(spreadsheet: Vec<Row>, reference: Vec<Row>) -> Result<Self, ReconError> {
        Ok(Self {
            spreadsheet: records_from_rows(Side::Spreadsheet, spreadsheet)?,
            reference: records_from_rows(Side::Reference, reference)?,
        })
    }
}

fn records_from_rows(side: Side, rows: Vec<Row>) -> Result<Vec<Record>, ReconError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| Record::from_row(side, index, row))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub spreadsheet_records: usize,
    pub reference_records: usize,
    pub reconciled: usize,
    pub unreconciled: usize,
    pub amount_mismatches: usize,
    pub only_in_spreadsheet: usize,
    pub only_in_reference: usize,
    /// Keys carried by more than one record on either side.
    pub duplicate_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    pub engine_version: String,
    pub run_at: String,
    pub amount_rule: String,
}

/// The classification result: `{reconciled, unreconciled}` plus bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub reconciled: Vec<ReconciledRow>,
    pub unreconciled: Vec<UnreconciledRow>,
}

impl ReconResult {
    pub fn is_fully_reconciled(&self) -> bool {
        self.unreconciled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn integral_float_ident_normalizes() {
        assert_eq!(Ident::from_json(&json!(1.0)), Some(Ident::Int(1)));
        assert_eq!(Ident::from_json(&json!(1)), Some(Ident::Int(1)));
        assert_eq!(Ident::from_json(&json!(1.5)), Some(Ident::Float(OrderedFloat(1.5))));
        assert_eq!(Ident::from_json(&json!(null)), None);
        assert_ne!(Ident::from_json(&json!("1")), Ident::from_json(&json!(1)));
    }

    #[test]
    fn amount_numeric_equality() {
        assert_eq!(Amount::Int(100), Amount::Float(100.0));
        assert_ne!(Amount::Int(100), Amount::Int(150));
        assert_eq!(Amount::from_json(&json!("100")), None);
        assert_eq!(Amount::Int(i64::MIN).abs_diff(&Amount::Int(i64::MAX)), u64::MAX as f64);
    }

    #[test]
    fn amount_equality_is_exact_beyond_f64_precision() {
        // 2^53 + 1 has no f64 representation; it rounds to 2^53.
        let big = 9_007_199_254_740_993_i64;
        assert_ne!(Amount::Int(big), Amount::Float(9_007_199_254_740_992.0));
        assert_ne!(Amount::Float(9_007_199_254_740_992.0), Amount::Int(big));
        assert_eq!(Amount::Int(big - 1), Amount::Float(9_007_199_254_740_992.0));
        assert_ne!(Amount::Int(i64::MAX), Amount::Float(i64::MAX as f64));
        assert_ne!(Amount::Int(1), Amount::Float(1.5));
    }

    #[test]
    fn from_row_splits_passthrough() {
        let rec = Record::from_row(
            Side::Reference,
            0,
            row(json!({"id": 1, "reference": "A", "amount": 100, "memo": "rent"})),
        )
        .unwrap();
        assert_eq!(rec.id, Ident::Int(1));
        assert_eq!(rec.reference, Ident::Text("A".into()));
        assert_eq!(rec.amount, Amount::Int(100));
        assert_eq!(rec.extra.get("memo"), Some(&json!("rent")));
        assert!(!rec.extra.contains_key("id"));
    }

    #[test]
    fn from_row_missing_field() {
        let err = Record::from_row(Side::Spreadsheet, 3, row(json!({"id": 1, "amount": 5})))
            .unwrap_err();
        assert_eq!(err.to_string(), "spreadsheet record 3: field 'reference' is missing");
    }

    #[test]
    fn from_row_rejects_string_amount() {
        let err = Record::from_row(
            Side::Reference,
            0,
            row(json!({"id": 1, "reference": "A", "amount": "100"})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be numeric"));
    }

    #[test]
    fn merged_fields_suffixes_collisions() {
        let left = Record::new(1, "A", 100).with_field("memo", "xl");
        let right = Record::new(1, "A", 100)
            .with_field("memo", "db")
            .with_field("posted", "2024-01-02");
        let fields = merged_fields(Some(&left), Some(&right));
        let keys: Vec<&str> = fields.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "reference",
                "amount_spreadsheet",
                "amount_reference",
                "memo_spreadsheet",
                "memo_reference",
                "posted",
            ]
        );
    }

    #[test]
    fn passthrough_never_shadows_computed_columns() {
        let left = Record::new(1, "A", 100)
            .with_field("amount_spreadsheet", "raw")
            .with_field("mismatch_reason", "note");
        let row = UnreconciledRow {
            reason: MismatchReason::OnlyInSpreadsheet,
            spreadsheet: Some(left),
            reference: None,
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["amount_spreadsheet"], json!(100));
        assert_eq!(v["amount_spreadsheet_spreadsheet"], json!("raw"));
        assert_eq!(v["mismatch_reason"], json!("only_in_spreadsheet"));
        assert_eq!(v["mismatch_reason_spreadsheet"], json!("note"));

        let text = serde_json::to_string(&row).unwrap();
        assert_eq!(text.matches("\"mismatch_reason\"").count(), 1);
    }

    #[test]
    fn unreconciled_row_serializes_reason() {
        let row = UnreconciledRow {
            reason: MismatchReason::OnlyInReference,
            spreadsheet: None,
            reference: Some(Record::new(9, "Z", 10)),
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["mismatch_reason"], json!("only_in_reference"));
        assert_eq!(v["amount_spreadsheet"], Value::Null);
        assert_eq!(v["amount_reference"], json!(10));
        assert_eq!(v["id"], json!(9));
    }
}
