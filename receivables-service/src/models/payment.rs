//! Payment and remittance models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment method accepted by field collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    GCash,
    Maya,
    BankTransfer,
    Check,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::GCash => "gcash",
            PaymentMethod::Maya => "maya",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Check => "check",
            PaymentMethod::Other => "other",
        }
    }

    /// Strict decode for untrusted input; unknown methods are rejected at
    /// the edge as a validation error.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "gcash" => Some(PaymentMethod::GCash),
            "maya" => Some(PaymentMethod::Maya),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "check" => Some(PaymentMethod::Check),
            "other" => Some(PaymentMethod::Other),
            _ => None,
        }
    }
}

/// A payment collected in the field against an order.
///
/// Once `reconciled` is set the record is frozen; `reconciled_at` and
/// `reconciliation_notes` are written exactly once by the claim that set it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub collector_id: Uuid,
    pub collector_name: String,
    pub recorded_at: DateTime<Utc>,
    pub reconciled: bool,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub reconciliation_notes: Option<String>,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub collector_id: Uuid,
    pub collector_name: String,
}

/// Per-collector remittance batch, derived on demand from the unreconciled
/// payments and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RemittanceBatch {
    pub collector_id: Uuid,
    pub collector_name: String,
    pub payment_ids: Vec<Uuid>,
    pub total_expected: Decimal,
}

/// Why a single batch item was not confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    AlreadyReconciled,
    NotFound,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::AlreadyReconciled => "AlreadyReconciled",
            FailureReason::NotFound => "NotFound",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub payment_id: Uuid,
    pub reason: FailureReason,
}

/// Outcome of a batch confirmation. Partial failure is an expected result,
/// not an error: the caller inspects `fail_count`/`failures`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub fail_count: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.fail_count == 0
    }
}
