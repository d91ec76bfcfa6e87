//! Delivery exception models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of delivery problem reported from the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionType {
    StoreClosed,
    CustomerRefused,
    IncorrectAddress,
    DamagedGoods,
    PartialDelivery,
    DelayedDelivery,
    Other,
}

impl ExceptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionType::StoreClosed => "store_closed",
            ExceptionType::CustomerRefused => "customer_refused",
            ExceptionType::IncorrectAddress => "incorrect_address",
            ExceptionType::DamagedGoods => "damaged_goods",
            ExceptionType::PartialDelivery => "partial_delivery",
            ExceptionType::DelayedDelivery => "delayed_delivery",
            ExceptionType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "store_closed" => Some(ExceptionType::StoreClosed),
            "customer_refused" => Some(ExceptionType::CustomerRefused),
            "incorrect_address" => Some(ExceptionType::IncorrectAddress),
            "damaged_goods" => Some(ExceptionType::DamagedGoods),
            "partial_delivery" => Some(ExceptionType::PartialDelivery),
            "delayed_delivery" => Some(ExceptionType::DelayedDelivery),
            "other" => Some(ExceptionType::Other),
            _ => None,
        }
    }
}

/// How an administrator closed out an exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionType {
    Resolved,
    Rescheduled,
    Returned,
    Cancelled,
    PartialResolution,
}

impl ResolutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionType::Resolved => "resolved",
            ResolutionType::Rescheduled => "rescheduled",
            ResolutionType::Returned => "returned",
            ResolutionType::Cancelled => "cancelled",
            ResolutionType::PartialResolution => "partial_resolution",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "resolved" => Some(ResolutionType::Resolved),
            "rescheduled" => Some(ResolutionType::Rescheduled),
            "returned" => Some(ResolutionType::Returned),
            "cancelled" => Some(ResolutionType::Cancelled),
            "partial_resolution" => Some(ResolutionType::PartialResolution),
            _ => None,
        }
    }
}

/// Order status values the resolution flow can push to the order sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InTransit,
    Delivered,
    Returned,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Returned => "returned",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// A reported delivery exception.
///
/// Lifecycle: created open (`resolved_at` unset), transitions exactly once
/// to resolved, terminal thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryException {
    pub exception_id: Uuid,
    pub order_id: Uuid,
    pub exception_type: ExceptionType,
    pub description: String,
    pub reported_at: DateTime<Utc>,
    pub reported_by: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_type: Option<ResolutionType>,
    pub resolution_notes: Option<String>,
    pub follow_up_required: bool,
}

impl DeliveryException {
    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}

/// Input for reporting a new exception.
#[derive(Debug, Clone)]
pub struct NewDeliveryException {
    pub order_id: Uuid,
    pub exception_type: ExceptionType,
    pub description: String,
    pub reported_by: String,
}

/// The terminal state written by a successful resolution claim.
#[derive(Debug, Clone)]
pub struct ResolutionClaim {
    pub resolved_at: DateTime<Utc>,
    pub resolution_type: ResolutionType,
    pub resolution_notes: String,
    pub follow_up_required: bool,
}
