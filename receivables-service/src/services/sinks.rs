//! Collaborator sink interfaces.
//!
//! The core never talks to the order pipeline or the notification channel
//! directly; it requests changes through these narrow traits. Both are
//! advisory side channels: the resolution flow logs and counts a failed
//! sink call and moves on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::info;
use uuid::Uuid;

use crate::models::OrderStatus;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ExceptionResolved,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ExceptionResolved => "exception_resolved",
        }
    }
}

/// Requests an order status change from the order pipeline.
#[async_trait]
pub trait OrderStatusSink: Send + Sync {
    async fn set_order_status(&self, order_id: Uuid, status: OrderStatus)
        -> Result<(), AppError>;
}

/// Fire-and-forget notification channel (dispatcher alerts etc.).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), AppError>;
}

/// Order sink that only logs the request. Default for embedders that wire
/// order propagation elsewhere.
#[derive(Debug, Default, Clone)]
pub struct LoggingOrderStatusSink;

#[async_trait]
impl OrderStatusSink for LoggingOrderStatusSink {
    async fn set_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), AppError> {
        info!(order_id = %order_id, status = status.as_str(), "order status update requested");
        Ok(())
    }
}

/// Notification sink that only logs the payload.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotificationSink;

#[async_trait]
impl NotificationSink for LoggingNotificationSink {
    async fn notify(
        &self,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), AppError> {
        info!(kind = kind.as_str(), payload = %payload, "notification emitted");
        Ok(())
    }
}
