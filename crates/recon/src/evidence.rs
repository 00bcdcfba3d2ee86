use crate::key::KeyIndex;
use crate::model::{MismatchReason, ReconSummary, ReconciledRow, UnreconciledRow};

/// Compute summary statistics from the assembled result.
pub fn compute_summary(
    spreadsheet: &KeyIndex<'_>,
    reference: &KeyIndex<'_>,
    reconciled: &[ReconciledRow],
    unreconciled: &[UnreconciledRow],
) -> ReconSummary {
    let mut amount_mismatches = 0;
    let mut only_in_spreadsheet = 0;
    let mut only_in_reference = 0;

    for r in unreconciled {
        match r.reason {
            MismatchReason::AmountMismatch => amount_mismatches += 1,
            MismatchReason::OnlyInSpreadsheet => only_in_spreadsheet += 1,
            MismatchReason::OnlyInReference => only_in_reference += 1,
        }
    }

    ReconSummary {
        spreadsheet_records: spreadsheet.record_count(),
        reference_records: reference.record_count(),
        reconciled: reconciled.len(),
        unreconciled: unreconciled.len(),
        amount_mismatches,
        only_in_spreadsheet,
        only_in_reference,
        duplicate_keys: spreadsheet.duplicates().len() + reference.duplicates().len(),
    }
}
