//! Persistence traits and the in-memory store.
//!
//! The stores are the single source of truth and may be hit by several
//! callers at once; the at-most-once guarantees of `claim_reconciled` and
//! `claim_resolved` are enforced here, inside the store, so every backend
//! yields exactly one winner per entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{DeliveryException, Invoice, Payment, ResolutionClaim};

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_payment(&self, payment: Payment) -> Result<(), AppError>;

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError>;

    /// Unreconciled payments, optionally for one collector, ordered by
    /// `recorded_at` ascending (stable).
    async fn list_unreconciled(
        &self,
        collector_id: Option<Uuid>,
    ) -> Result<Vec<Payment>, AppError>;

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, AppError>;

    /// Atomically flip `reconciled` and set the provenance fields. Exactly
    /// one concurrent caller wins; the rest observe `AlreadyReconciled`.
    async fn claim_reconciled(
        &self,
        payment_id: Uuid,
        reconciled_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<Payment, AppError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn upsert_invoice(&self, invoice: Invoice) -> Result<(), AppError>;

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Option<Invoice>, AppError>;

    async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError>;
}

#[async_trait]
pub trait ExceptionStore: Send + Sync {
    async fn insert_exception(&self, exception: DeliveryException) -> Result<(), AppError>;

    async fn get_exception(
        &self,
        exception_id: Uuid,
    ) -> Result<Option<DeliveryException>, AppError>;

    /// Open exceptions, ordered by `reported_at` ascending.
    async fn list_open(&self) -> Result<Vec<DeliveryException>, AppError>;

    /// Atomically move an open exception to its terminal resolved state.
    /// Exactly one concurrent caller wins; the rest observe `AlreadyResolved`.
    async fn claim_resolved(
        &self,
        exception_id: Uuid,
        claim: ResolutionClaim,
    ) -> Result<DeliveryException, AppError>;
}

/// In-memory store backing tests and single-process embedders. Claims take
/// the write lock, so check-and-set is atomic.
#[derive(Default)]
pub struct InMemoryStore {
    payments: RwLock<HashMap<Uuid, Payment>>,
    invoices: RwLock<HashMap<Uuid, Invoice>>,
    exceptions: RwLock<HashMap<Uuid, DeliveryException>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn insert_payment(&self, payment: Payment) -> Result<(), AppError> {
        self.payments
            .write()
            .await
            .insert(payment.payment_id, payment);
        Ok(())
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(self.payments.read().await.get(&payment_id).cloned())
    }

    async fn list_unreconciled(
        &self,
        collector_id: Option<Uuid>,
    ) -> Result<Vec<Payment>, AppError> {
        let payments = self.payments.read().await;
        let mut result: Vec<Payment> = payments
            .values()
            .filter(|p| !p.reconciled)
            .filter(|p| collector_id.map_or(true, |c| p.collector_id == c))
            .cloned()
            .collect();
        // payment_id as tiebreaker keeps the order stable for equal timestamps
        result.sort_by_key(|p| (p.recorded_at, p.payment_id));
        Ok(result)
    }

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let payments = self.payments.read().await;
        let mut result: Vec<Payment> = payments
            .values()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| (p.recorded_at, p.payment_id));
        Ok(result)
    }

    async fn claim_reconciled(
        &self,
        payment_id: Uuid,
        reconciled_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<Payment, AppError> {
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(&payment_id)
            .ok_or_else(|| AppError::not_found(format!("payment {payment_id}")))?;

        if payment.reconciled {
            return Err(AppError::AlreadyReconciled { payment_id });
        }

        payment.reconciled = true;
        payment.reconciled_at = Some(reconciled_at);
        payment.reconciliation_notes = Some(notes.to_string());
        Ok(payment.clone())
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn upsert_invoice(&self, invoice: Invoice) -> Result<(), AppError> {
        self.invoices
            .write()
            .await
            .insert(invoice.invoice_id, invoice);
        Ok(())
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Option<Invoice>, AppError> {
        Ok(self.invoices.read().await.get(&invoice_id).cloned())
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError> {
        let invoices = self.invoices.read().await;
        let mut result: Vec<Invoice> = invoices.values().cloned().collect();
        result.sort_by_key(|i| (i.issued_at, i.invoice_id));
        Ok(result)
    }
}

#[async_trait]
impl ExceptionStore for InMemoryStore {
    async fn insert_exception(&self, exception: DeliveryException) -> Result<(), AppError> {
        self.exceptions
            .write()
            .await
            .insert(exception.exception_id, exception);
        Ok(())
    }

    async fn get_exception(
        &self,
        exception_id: Uuid,
    ) -> Result<Option<DeliveryException>, AppError> {
        Ok(self.exceptions.read().await.get(&exception_id).cloned())
    }

    async fn list_open(&self) -> Result<Vec<DeliveryException>, AppError> {
        let exceptions = self.exceptions.read().await;
        let mut result: Vec<DeliveryException> = exceptions
            .values()
            .filter(|e| e.is_open())
            .cloned()
            .collect();
        result.sort_by_key(|e| (e.reported_at, e.exception_id));
        Ok(result)
    }

    async fn claim_resolved(
        &self,
        exception_id: Uuid,
        claim: ResolutionClaim,
    ) -> Result<DeliveryException, AppError> {
        let mut exceptions = self.exceptions.write().await;
        let exception = exceptions
            .get_mut(&exception_id)
            .ok_or_else(|| AppError::not_found(format!("exception {exception_id}")))?;

        if !exception.is_open() {
            return Err(AppError::AlreadyResolved { exception_id });
        }

        exception.resolved_at = Some(claim.resolved_at);
        exception.resolution_type = Some(claim.resolution_type);
        exception.resolution_notes = Some(claim.resolution_notes);
        exception.follow_up_required = claim.follow_up_required;
        Ok(exception.clone())
    }
}
