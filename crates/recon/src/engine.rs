use crate::assemble::assemble;
use crate::classify::classify;
use crate::compare::AmountComparator;
use crate::config::{DuplicatePolicy, ReconConfig};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::key::KeyIndex;
use crate::matcher::full_outer_join;
use crate::model::{Record, ReconInput, ReconMeta, ReconResult, Row, Side};
use crate::observer::{ReconObserver, TracingObserver};

/// Reconcile two record sets with default settings, logging through `tracing`.
pub fn reconcile(spreadsheet: &[Record], reference: &[Record]) -> Result<ReconResult, ReconError> {
    let config = ReconConfig::default();
    let rule = config.amount.rule();
    execute(&config, spreadsheet, reference, &rule, &TracingObserver)
}

/// Run reconciliation per config. Returns classified rows + summary.
pub fn run(
    config: &ReconConfig,
    input: &ReconInput,
    observer: &dyn ReconObserver,
) -> Result<ReconResult, ReconError> {
    let rule = config.amount.rule();
    run_with_comparator(config, input, &rule, observer)
}

/// Like [`run`], with a caller-supplied amount comparison.
pub fn run_with_comparator(
    config: &ReconConfig,
    input: &ReconInput,
    comparator: &dyn AmountComparator,
    observer: &dyn ReconObserver,
) -> Result<ReconResult, ReconError> {
    execute(config, &input.spreadsheet, &input.reference, comparator, observer)
}

/// Validate loose rows from both sides, then run. Nothing is indexed if any
/// row fails schema validation.
pub fn run_rows(
    config: &ReconConfig,
    spreadsheet: Vec<Row>,
    reference: Vec<Row>,
    observer: &dyn ReconObserver,
) -> Result<ReconResult, ReconError> {
    let input = ReconInput::from_rows(spreadsheet, reference).inspect_err(|e| observer.failed(e))?;
    run(config, &input, observer)
}

fn execute(
    config: &ReconConfig,
    spreadsheet: &[Record],
    reference: &[Record],
    comparator: &dyn AmountComparator,
    observer: &dyn ReconObserver,
) -> Result<ReconResult, ReconError> {
    observer.run_started(spreadsheet.len(), reference.len());

    if config.require_reference && reference.is_empty() {
        let err = ReconError::EmptyInput { side: Side::Reference };
        observer.failed(&err);
        return Err(err);
    }

    let (left, right) = build_indexes(spreadsheet, reference, config.parallel_index);
    for (side, index) in [(Side::Spreadsheet, &left), (Side::Reference, &right)] {
        observer.side_indexed(side, index.record_count(), index.key_count(), index.duplicates().len());
    }

    if config.duplicates == DuplicatePolicy::Reject {
        reject_duplicates(Side::Spreadsheet, &left)
            .and_then(|_| reject_duplicates(Side::Reference, &right))
            .inspect_err(|e| observer.failed(e))?;
    }

    let rows = full_outer_join(&left, &right);
    observer.joined(rows.len());

    let (reconciled, unreconciled) = assemble(classify(&rows, comparator));
    let summary = compute_summary(&left, &right, &reconciled, &unreconciled);
    observer.finished(&summary);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            amount_rule: comparator.describe(),
        },
        summary,
        reconciled,
        unreconciled,
    })
}

/// Index both sides. The two builds share nothing, so they may run on two
/// scoped threads and meet again before the join.
fn build_indexes<'a>(
    spreadsheet: &'a [Record],
    reference: &'a [Record],
    parallel: bool,
) -> (KeyIndex<'a>, KeyIndex<'a>) {
    if !parallel {
        return (KeyIndex::build(spreadsheet), KeyIndex::build(reference));
    }

    std::thread::scope(|s| {
        let handle = s.spawn(|| KeyIndex::build(reference));
        let left = KeyIndex::build(spreadsheet);
        let right = handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (left, right)
    })
}

fn reject_duplicates(side: Side, index: &KeyIndex<'_>) -> Result<(), ReconError> {
    match index.duplicates().first() {
        Some((key, count)) => Err(ReconError::DuplicateKey {
            side,
            key: key.to_string(),
            count: *count,
        }),
        None => Ok(()),
    }
}
