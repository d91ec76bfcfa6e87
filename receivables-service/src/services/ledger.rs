//! Payment ledger: the authoritative owner of payment records.

use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{NewPayment, Payment};
use crate::services::metrics;
use crate::services::store::PaymentStore;

/// Service facade over the payment store. Validation and observability live
/// here; the one-winner reconciliation claim lives in the store.
#[derive(Clone)]
pub struct PaymentLedger {
    store: Arc<dyn PaymentStore>,
}

impl PaymentLedger {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Record a payment collected in the field. Rejects non-positive amounts
    /// before any mutation.
    #[instrument(skip(self, input), fields(order_id = %input.order_id, collector_id = %input.collector_id))]
    pub async fn record_payment(&self, input: NewPayment) -> Result<Payment, AppError> {
        if input.amount <= Decimal::ZERO {
            metrics::record_error("validation");
            return Err(AppError::validation(format!(
                "payment amount must be positive, got {}",
                input.amount
            )));
        }

        let payment = Payment {
            payment_id: Uuid::new_v4(),
            order_id: input.order_id,
            amount: input.amount,
            method: input.method,
            collector_id: input.collector_id,
            collector_name: input.collector_name,
            recorded_at: Utc::now(),
            reconciled: false,
            reconciled_at: None,
            reconciliation_notes: None,
        };

        self.store.insert_payment(payment.clone()).await?;
        metrics::record_payment_recorded(payment.method.as_str());
        info!(
            payment_id = %payment.payment_id,
            amount = %payment.amount,
            method = payment.method.as_str(),
            "payment recorded"
        );

        Ok(payment)
    }

    /// Confirm a single payment against the distributor's records.
    ///
    /// At most once per payment: a second call (or a concurrent loser)
    /// gets `AlreadyReconciled`.
    #[instrument(skip(self, notes), fields(payment_id = %payment_id))]
    pub async fn mark_reconciled(
        &self,
        payment_id: Uuid,
        notes: &str,
    ) -> Result<Payment, AppError> {
        let payment = self
            .store
            .claim_reconciled(payment_id, Utc::now(), notes)
            .await?;

        info!(payment_id = %payment.payment_id, "payment reconciled");
        Ok(payment)
    }

    /// Unreconciled payments, optionally for one collector, ordered by
    /// `recorded_at` ascending.
    pub async fn list_unreconciled(
        &self,
        collector_id: Option<Uuid>,
    ) -> Result<Vec<Payment>, AppError> {
        self.store.list_unreconciled(collector_id).await
    }

    pub async fn get_payment(&self, payment_id: Uuid) -> Result<Payment, AppError> {
        self.store
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("payment {payment_id}")))
    }

    pub async fn list_payments_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Payment>, AppError> {
        self.store.list_for_order(order_id).await
    }
}
