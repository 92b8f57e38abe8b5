//! Multi-threaded batch runner.

use std::sync::Arc;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{add, calculate_payroll};
use crate::config::JurisdictionRegistry;
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeCompensationInput, PayPeriod, PayrollResult};

use super::CancellationToken;

/// One employee's calculation request within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// The employee's compensation for the period.
    pub compensation: EmployeeCompensationInput,
    /// The pay period being calculated.
    pub pay_period: PayPeriod,
}

/// The outcome for a single batch item.
#[derive(Debug)]
pub enum BatchItemOutcome {
    /// The calculation completed.
    Succeeded(PayrollResult),
    /// The calculation failed with an engine error.
    Failed(EngineError),
    /// The item was not started because the batch was cancelled.
    Skipped,
}

/// The outcome of one item, tagged with its position in the input.
#[derive(Debug)]
pub struct BatchItemReport {
    /// Zero-based position of the item in the submitted batch.
    pub index: usize,
    /// The employee id from the input, if any.
    pub employee_id: Option<String>,
    /// What happened to the item.
    pub outcome: BatchItemOutcome,
}

/// Counts and totals for a batch.
///
/// Totals cover succeeded items only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items that completed.
    pub succeeded: usize,
    /// Items that failed.
    pub failed: usize,
    /// Items skipped after cancellation.
    pub skipped: usize,
    /// Sum of gross pay.
    pub total_gross_pay: Decimal,
    /// Sum of employee deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net_pay: Decimal,
    /// Sum of employer contributions.
    pub total_employer_contributions: Decimal,
}

impl BatchSummary {
    fn record(&mut self, outcome: &BatchItemOutcome) -> EngineResult<()> {
        match outcome {
            BatchItemOutcome::Succeeded(result) => {
                self.succeeded += 1;
                self.total_gross_pay = add(self.total_gross_pay, result.gross_pay, "batch gross pay")?;
                self.total_deductions = add(
                    self.total_deductions,
                    result.total_deductions,
                    "batch deductions",
                )?;
                self.total_net_pay = add(self.total_net_pay, result.net_pay, "batch net pay")?;
                self.total_employer_contributions = add(
                    self.total_employer_contributions,
                    result.employer_contributions.total,
                    "batch employer contributions",
                )?;
            }
            BatchItemOutcome::Failed(_) => self.failed += 1,
            BatchItemOutcome::Skipped => self.skipped += 1,
        }
        Ok(())
    }
}

/// Per-item outcomes in input order plus the summary.
#[derive(Debug)]
pub struct BatchReport {
    /// One report per submitted item, in submission order.
    pub items: Vec<BatchItemReport>,
    /// Counts and totals.
    pub summary: BatchSummary,
}

/// Options controlling a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Number of rayon worker threads. Zero is treated as one.
    pub workers: usize,
    /// Stop starting new items after the first failure.
    pub fail_fast: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: rayon::current_num_threads(),
            fail_fast: false,
        }
    }
}

/// Runs payroll calculations for many employees against a shared registry.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use payroll_engine::batch::{BatchOptions, BatchRunner, CancellationToken};
/// use payroll_engine::config::ConfigLoader;
///
/// let registry = Arc::new(ConfigLoader::load("./config").unwrap().into_registry());
/// let runner = BatchRunner::new(registry, BatchOptions::default());
/// let report = runner.run(&[], &CancellationToken::new()).unwrap();
/// assert_eq!(report.items.len(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct BatchRunner {
    registry: Arc<JurisdictionRegistry>,
    options: BatchOptions,
}

impl BatchRunner {
    /// Creates a runner over an immutable registry.
    pub fn new(registry: Arc<JurisdictionRegistry>, options: BatchOptions) -> Self {
        Self { registry, options }
    }

    /// The options this runner was built with.
    pub fn options(&self) -> BatchOptions {
        self.options
    }

    /// Calculates every item, honouring `token` before each one.
    ///
    /// Items already started when the token is cancelled run to completion;
    /// the rest are reported as skipped. With `fail_fast`, the first failure
    /// cancels a child of `token`, so new items stop starting while the
    /// caller's token stays untouched.
    ///
    /// A failed item never fails the run. The run fails with
    /// `CalculationError` only when a summary total overflows.
    pub fn run(&self, items: &[BatchItem], token: &CancellationToken) -> EngineResult<BatchReport> {
        let workers = self.options.workers.clamp(1, items.len().max(1));
        info!(
            items = items.len(),
            workers = workers,
            fail_fast = self.options.fail_fast,
            "Starting payroll batch"
        );

        let halted = token.child_token();
        let calculate_all = || -> Vec<BatchItemOutcome> {
            items
                .par_iter()
                .enumerate()
                .map(|(index, item)| {
                    if halted.is_cancelled() {
                        return BatchItemOutcome::Skipped;
                    }
                    let outcome = self.calculate(index, item);
                    if self.options.fail_fast && matches!(outcome, BatchItemOutcome::Failed(_)) {
                        halted.cancel();
                    }
                    outcome
                })
                .collect()
        };

        let outcomes = match ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(calculate_all),
            Err(error) => {
                warn!(error = %error, "Batch pool unavailable, using the global pool");
                calculate_all()
            }
        };

        let mut summary = BatchSummary::default();
        let mut reports = Vec::with_capacity(items.len());
        for (index, (outcome, item)) in outcomes.into_iter().zip(items).enumerate() {
            summary.record(&outcome)?;
            reports.push(BatchItemReport {
                index,
                employee_id: item.compensation.employee_id.clone(),
                outcome,
            });
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            total_net_pay = %summary.total_net_pay,
            "Payroll batch finished"
        );

        Ok(BatchReport {
            items: reports,
            summary,
        })
    }

    fn calculate(&self, index: usize, item: &BatchItem) -> BatchItemOutcome {
        match calculate_payroll(&item.compensation, &item.pay_period, &self.registry) {
            Ok(result) => BatchItemOutcome::Succeeded(result),
            Err(error) => {
                warn!(
                    index = index,
                    employee_id = item.compensation.employee_id.as_deref().unwrap_or("-"),
                    error = %error,
                    "Batch item failed"
                );
                BatchItemOutcome::Failed(error)
            }
        }
    }
}
