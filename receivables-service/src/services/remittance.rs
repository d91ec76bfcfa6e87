//! Remittance batching and batch confirmation.

use service_core::error::AppError;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{BatchFailure, BatchOutcome, FailureReason, Payment, RemittanceBatch};
use crate::services::ledger::PaymentLedger;
use crate::services::metrics;

/// Partition payments into per-collector remittance batches.
///
/// Pure and deterministic: batch payment order follows the input order
/// (callers pass `list_unreconciled` output, so `recorded_at` ascending),
/// totals are summed with `Decimal`, and batches come back sorted by
/// collector name then id. Narrowing `payment_ids` for a partial remittance
/// is the caller's concern.
pub fn group_by_collector(payments: &[Payment]) -> Vec<RemittanceBatch> {
    let mut by_collector: HashMap<Uuid, RemittanceBatch> = HashMap::new();

    for payment in payments {
        let batch = by_collector
            .entry(payment.collector_id)
            .or_insert_with(|| RemittanceBatch {
                collector_id: payment.collector_id,
                collector_name: payment.collector_name.clone(),
                payment_ids: Vec::new(),
                total_expected: rust_decimal::Decimal::ZERO,
            });
        batch.payment_ids.push(payment.payment_id);
        batch.total_expected += payment.amount;
    }

    let mut batches: Vec<RemittanceBatch> = by_collector.into_values().collect();
    batches.sort_by(|a, b| {
        a.collector_name
            .cmp(&b.collector_name)
            .then(a.collector_id.cmp(&b.collector_id))
    });
    batches
}

/// Confirms remittance batches against the payment ledger.
#[derive(Clone)]
pub struct RemittanceProcessor {
    ledger: PaymentLedger,
}

impl RemittanceProcessor {
    pub fn new(ledger: PaymentLedger) -> Self {
        Self { ledger }
    }

    /// Confirm a batch, one payment at a time, in the order given.
    ///
    /// Continue-on-error is the business rule: a stale item (already
    /// reconciled by a concurrent confirmation, or deleted) is recorded in
    /// the outcome and the rest of the batch still lands. Items are
    /// processed strictly sequentially so the failure list is deterministic
    /// and attributable. Only a malformed call (empty batch) is an error;
    /// the summary is returned even when every item failed.
    #[instrument(skip(self, payment_ids, notes), fields(batch_size = payment_ids.len()))]
    pub async fn reconcile_batch(
        &self,
        payment_ids: &[Uuid],
        notes: &str,
    ) -> Result<BatchOutcome, AppError> {
        if payment_ids.is_empty() {
            metrics::record_error("validation");
            return Err(AppError::validation("reconcile_batch requires at least one payment id"));
        }

        let mut outcome = BatchOutcome::default();

        for &payment_id in payment_ids {
            match self.ledger.mark_reconciled(payment_id, notes).await {
                Ok(_) => {
                    outcome.success_count += 1;
                    metrics::record_reconciliation_item("confirmed");
                }
                Err(AppError::AlreadyReconciled { .. }) => {
                    warn!(payment_id = %payment_id, "batch item already reconciled, skipping");
                    outcome.failures.push(BatchFailure {
                        payment_id,
                        reason: FailureReason::AlreadyReconciled,
                    });
                    outcome.fail_count += 1;
                    metrics::record_reconciliation_item("already_reconciled");
                }
                Err(AppError::NotFound(_)) => {
                    warn!(payment_id = %payment_id, "batch item not found, skipping");
                    outcome.failures.push(BatchFailure {
                        payment_id,
                        reason: FailureReason::NotFound,
                    });
                    outcome.fail_count += 1;
                    metrics::record_reconciliation_item("not_found");
                }
                // Store-level failures are not per-item outcomes; abort.
                Err(err) => {
                    metrics::record_error(err.kind());
                    return Err(err);
                }
            }
        }

        let status = if outcome.is_clean() { "clean" } else { "partial" };
        metrics::record_batch_processed(status);
        info!(
            success_count = outcome.success_count,
            fail_count = outcome.fail_count,
            "remittance batch processed"
        );

        Ok(outcome)
    }
}
