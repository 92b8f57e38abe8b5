//! Bulk payroll runs.
//!
//! A [`BatchRunner`] calculates many independent employees on a rayon pool.
//! Each employee is either fully calculated, reported as failed, or skipped
//! after cancellation; nothing is ever half-computed.

mod runner;

pub use runner::{
    BatchItem, BatchItemOutcome, BatchItemReport, BatchOptions, BatchReport, BatchRunner,
    BatchSummary,
};
pub use tokio_util::sync::CancellationToken;
