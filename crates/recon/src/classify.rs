use crate::compare::AmountComparator;
use crate::model::{JoinRow, MismatchReason, ReconciledRow, UnreconciledRow};

/// Join rows partitioned into the four outcome categories.
#[derive(Debug, Default)]
pub struct Classified {
    pub reconciled: Vec<ReconciledRow>,
    pub amount_mismatches: Vec<UnreconciledRow>,
    pub only_in_spreadsheet: Vec<UnreconciledRow>,
    pub only_in_reference: Vec<UnreconciledRow>,
}

/// Assign every join row to exactly one category, preserving join order.
pub fn classify(rows: &[JoinRow<'_>], comparator: &dyn AmountComparator) -> Classified {
    let mut out = Classified::default();

    for row in rows {
        match (row.left, row.right) {
            (Some(left), Some(right)) => {
                if comparator.amounts_equal(left.amount, right.amount) {
                    out.reconciled.push(ReconciledRow {
                        spreadsheet: left.clone(),
                        reference: right.clone(),
                    });
                } else {
                    out.amount_mismatches.push(UnreconciledRow {
                        reason: MismatchReason::AmountMismatch,
                        spreadsheet: Some(left.clone()),
                        reference: Some(right.clone()),
                    });
                }
            }
            (Some(left), None) => {
                out.only_in_spreadsheet.push(UnreconciledRow {
                    reason: MismatchReason::OnlyInSpreadsheet,
                    spreadsheet: Some(left.clone()),
                    reference: None,
                });
            }
            (None, Some(right)) => {
                out.only_in_reference.push(UnreconciledRow {
                    reason: MismatchReason::OnlyInReference,
                    spreadsheet: None,
                    reference: Some(right.clone()),
                });
            }
            (None, None) => {}
        }
    }

    out
}
