use crate::classify::Classified;
use crate::model::{ReconciledRow, UnreconciledRow};

/// Merge the mismatch categories into one `unreconciled` sequence.
///
/// Order is fixed: amount mismatches, then spreadsheet-only, then
/// reference-only. No filtering or deduplication.
pub fn assemble(classified: Classified) -> (Vec<ReconciledRow>, Vec<UnreconciledRow>) {
    let Classified {
        reconciled,
        amount_mismatches,
        only_in_spreadsheet,
        only_in_reference,
    } = classified;

    let mut unreconciled = Vec::with_capacity(
        amount_mismatches.len() + only_in_spreadsheet.len() + only_in_reference.len(),
    );
    unreconciled.extend(amount_mismatches);
    unreconciled.extend(only_in_spreadsheet);
    unreconciled.extend(only_in_reference);

    (reconciled, unreconciled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MismatchReason, Record};

    fn unrec(reason: MismatchReason, id: i64) -> UnreconciledRow {
        UnreconciledRow {
            reason,
            spreadsheet: Some(Record::new(id, "X", 1)),
            reference: None,
        }
    }

    #[test]
    fn category_order_is_fixed() {
        let classified = Classified {
            reconciled: vec![],
            amount_mismatches: vec![unrec(MismatchReason::AmountMismatch, 1)],
            only_in_spreadsheet: vec![
                unrec(MismatchReason::OnlyInSpreadsheet, 2),
                unrec(MismatchReason::OnlyInSpreadsheet, 3),
            ],
            only_in_reference: vec![unrec(MismatchReason::OnlyInReference, 4)],
        };
        let (reconciled, unreconciled) = assemble(classified);
        assert!(reconciled.is_empty());
        let reasons: Vec<_> = unreconciled.iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                MismatchReason::AmountMismatch,
                MismatchReason::OnlyInSpreadsheet,
                MismatchReason::OnlyInSpreadsheet,
                MismatchReason::OnlyInReference,
            ]
        );
    }
}
