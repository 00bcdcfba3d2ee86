//! Progress hooks passed into the engine boundary.
//!
//! The engine never logs through a global; callers choose an observer.
//! `TracingObserver` forwards to `tracing`, `NoopObserver` discards.

use crate::error::ReconError;
use crate::model::{ReconSummary, Side};

pub trait ReconObserver {
    fn run_started(&self, _spreadsheet_records: usize, _reference_records: usize) {}

    fn side_indexed(&self, _side: Side, _records: usize, _keys: usize, _duplicate_keys: usize) {}

    fn joined(&self, _rows: usize) {}

    fn finished(&self, _summary: &ReconSummary) {}

    fn failed(&self, _error: &ReconError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReconObserver for NoopObserver {}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReconObserver for TracingObserver {
    fn run_started(&self, spreadsheet_records: usize, reference_records: usize) {
        tracing::info!(spreadsheet_records, reference_records, "starting reconciliation");
    }

    fn side_indexed(&self, side: Side, records: usize, keys: usize, duplicate_keys: usize) {
        if duplicate_keys > 0 {
            tracing::warn!(%side, records, keys, duplicate_keys, "duplicate composite keys");
        } else {
            tracing::debug!(%side, records, keys, "indexed records");
        }
    }

    fn joined(&self, rows: usize) {
        tracing::debug!(rows, "outer join complete");
    }

    fn finished(&self, summary: &ReconSummary) {
        tracing::info!(
            reconciled = summary.reconciled,
            amount_mismatches = summary.amount_mismatches,
            only_in_spreadsheet = summary.only_in_spreadsheet,
            only_in_reference = summary.only_in_reference,
            "reconciliation finished"
        );
    }

    fn failed(&self, error: &ReconError) {
        tracing::error!(%error, "reconciliation rejected input");
    }
}
