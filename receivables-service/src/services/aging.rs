//! Invoice aging and AR summaries.
//!
//! Aging is always derived from `issued_at`/`due_at`/`paid_amount` at read
//! time; nothing here mutates invoice aggregates, so these reads are safe to
//! compute concurrently or cache.

use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;

use crate::config::AgingConfig;
use crate::models::{ArSummary, Invoice};
use crate::services::store::InvoiceStore;

/// Compute the AR aging summary over a set of invoices.
///
/// Only invoices with an outstanding balance are bucketed; each lands in
/// exactly one bucket by whole days since issue (0-30 current, then 31-60,
/// 61-90, 90+ per the configured boundaries). `total_invoices` counts the
/// whole input, paid or not.
pub fn compute_ar_summary(
    invoices: &[Invoice],
    as_of: DateTime<Utc>,
    config: &AgingConfig,
) -> ArSummary {
    let mut summary = ArSummary {
        total_invoices: invoices.len(),
        ..ArSummary::default()
    };

    for invoice in invoices {
        if invoice.is_paid() {
            continue;
        }

        let outstanding = invoice.outstanding();
        summary.total_outstanding += outstanding;

        let age = invoice.age_days(as_of);
        if age <= config.current_max_days {
            summary.current += outstanding;
        } else if age <= config.tier_two_max_days {
            summary.bucket_31_to_60 += outstanding;
        } else if age <= config.tier_three_max_days {
            summary.bucket_61_to_90 += outstanding;
        } else {
            summary.bucket_90_plus += outstanding;
        }

        if invoice.due_at < as_of {
            summary.overdue_count += 1;
        }
    }

    summary
}

/// Unpaid invoices past due, most overdue first.
pub fn overdue_invoices(invoices: &[Invoice], as_of: DateTime<Utc>) -> Vec<Invoice> {
    let mut overdue: Vec<Invoice> = invoices
        .iter()
        .filter(|i| !i.is_paid() && i.due_at < as_of)
        .cloned()
        .collect();
    overdue.sort_by_key(|i| (i.due_at, i.invoice_id));
    overdue
}

/// Store-backed aging reads for the reporting views.
#[derive(Clone)]
pub struct AgingService {
    store: Arc<dyn InvoiceStore>,
    config: AgingConfig,
}

impl AgingService {
    pub fn new(store: Arc<dyn InvoiceStore>, config: AgingConfig) -> Self {
        Self { store, config }
    }

    #[instrument(skip(self))]
    pub async fn ar_summary(&self, as_of: DateTime<Utc>) -> Result<ArSummary, AppError> {
        let invoices = self.store.list_invoices().await?;
        Ok(compute_ar_summary(&invoices, as_of, &self.config))
    }

    #[instrument(skip(self))]
    pub async fn overdue(&self, as_of: DateTime<Utc>) -> Result<Vec<Invoice>, AppError> {
        let invoices = self.store.list_invoices().await?;
        Ok(overdue_invoices(&invoices, as_of))
    }
}
