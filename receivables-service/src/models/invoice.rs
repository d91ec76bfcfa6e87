//! Invoice model and AR summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived invoice status. Never stored: always computed from the amounts
/// and due date at read time so it cannot drift from the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Paid,
    Overdue,
    Pending,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Pending => "pending",
        }
    }
}

/// A store invoice tracked for accounts receivable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub store_id: Uuid,
    pub store_name: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.paid_amount >= self.total_amount
    }

    /// Remaining balance, floored at zero for overpayments.
    pub fn outstanding(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }

    pub fn status_as_of(&self, as_of: DateTime<Utc>) -> InvoiceStatus {
        if self.is_paid() {
            InvoiceStatus::Paid
        } else if self.due_at < as_of {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Pending
        }
    }

    /// Age in whole days since issue.
    pub fn age_days(&self, as_of: DateTime<Utc>) -> i64 {
        (as_of - self.issued_at).num_days()
    }
}

/// AR aging summary consumed by the reporting views.
///
/// Each outstanding invoice lands in exactly one bucket and contributes to
/// `total_outstanding` exactly once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArSummary {
    pub total_outstanding: Decimal,
    pub current: Decimal,
    pub bucket_31_to_60: Decimal,
    pub bucket_61_to_90: Decimal,
    pub bucket_90_plus: Decimal,
    pub overdue_count: usize,
    pub total_invoices: usize,
}
