//! `tally-recon`: two-source transaction reconciliation engine.
//!
//! Pure engine crate: receives pre-parsed records, returns classified results.
//! No CLI or IO dependencies. Progress is reported through an injected
//! [`ReconObserver`].

pub mod assemble;
pub mod classify;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod key;
pub mod matcher;
pub mod model;
pub mod observer;

pub use compare::{AmountComparator, AmountRule};
pub use config::ReconConfig;
pub use engine::{reconcile, run, run_rows, run_with_comparator};
pub use error::ReconError;
pub use model::{
    Amount, Ident, MismatchReason, Record, ReconInput, ReconResult, ReconciledRow, Row, Side,
    UnreconciledRow,
};
pub use observer::{NoopObserver, ReconObserver, TracingObserver};
