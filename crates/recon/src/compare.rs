use std::fmt;

use crate::model::Amount;

/// Decides whether two amounts on a BOTH pairing count as equal.
pub trait AmountComparator {
    fn amounts_equal(&self, spreadsheet: Amount, reference: Amount) -> bool;

    /// Short label recorded in the result metadata.
    fn describe(&self) -> String;
}

/// Built-in comparison rules selectable from config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountRule {
    /// Numeric equality, no tolerance.
    Exact,
    /// `|a - b| <= tolerance`.
    Tolerance(f64),
}

impl AmountComparator for AmountRule {
    fn amounts_equal(&self, spreadsheet: Amount, reference: Amount) -> bool {
        match self {
            Self::Exact => spreadsheet == reference,
            Self::Tolerance(t) => spreadsheet.abs_diff(&reference) <= *t,
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AmountRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Tolerance(t) => write!(f, "tolerance({t})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_is_numeric_not_textual() {
        assert!(AmountRule::Exact.amounts_equal(Amount::Int(100), Amount::Float(100.0)));
        assert!(!AmountRule::Exact.amounts_equal(Amount::Int(100), Amount::Int(150)));
    }

    #[test]
    fn exact_has_no_float_slack() {
        // 0.1 + 0.2 is not 0.3 in binary floating point
        assert!(!AmountRule::Exact.amounts_equal(Amount::Float(0.1 + 0.2), Amount::Float(0.3)));
        assert!(AmountRule::Tolerance(1e-9).amounts_equal(Amount::Float(0.1 + 0.2), Amount::Float(0.3)));
    }

    #[test]
    fn tolerance_is_inclusive() {
        let rule = AmountRule::Tolerance(1.0);
        assert!(rule.amounts_equal(Amount::Int(100), Amount::Int(101)));
        assert!(!rule.amounts_equal(Amount::Int(100), Amount::Int(102)));
    }

    #[test]
    fn describe_labels() {
        assert_eq!(AmountRule::Exact.describe(), "exact");
        assert_eq!(AmountRule::Tolerance(0.5).describe(), "tolerance(0.5)");
    }
}
