//! Delivery-exception resolution.

use chrono::Utc;
use serde_json::json;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::ResolutionConfig;
use crate::models::{
    DeliveryException, NewDeliveryException, OrderStatus, ResolutionClaim, ResolutionType,
};
use crate::services::metrics;
use crate::services::sinks::{NotificationKind, NotificationSink, OrderStatusSink};
use crate::services::store::ExceptionStore;

/// Runs the single Open -> Resolved transition for reported delivery
/// exceptions and propagates its side effects.
///
/// The exception record is the source of truth for "this issue was handled";
/// the order-status and notification calls are best-effort and never roll
/// back a resolution.
#[derive(Clone)]
pub struct ResolutionService {
    store: Arc<dyn ExceptionStore>,
    orders: Arc<dyn OrderStatusSink>,
    notifications: Arc<dyn NotificationSink>,
    config: ResolutionConfig,
}

impl ResolutionService {
    pub fn new(
        store: Arc<dyn ExceptionStore>,
        orders: Arc<dyn OrderStatusSink>,
        notifications: Arc<dyn NotificationSink>,
        config: ResolutionConfig,
    ) -> Self {
        Self {
            store,
            orders,
            notifications,
            config,
        }
    }

    /// Record a newly reported exception (entry point for the delivery
    /// tracking collaborator). Exceptions start open.
    #[instrument(skip(self, input), fields(order_id = %input.order_id))]
    pub async fn report_exception(
        &self,
        input: NewDeliveryException,
    ) -> Result<DeliveryException, AppError> {
        let exception = DeliveryException {
            exception_id: Uuid::new_v4(),
            order_id: input.order_id,
            exception_type: input.exception_type,
            description: input.description,
            reported_at: Utc::now(),
            reported_by: input.reported_by,
            resolved_at: None,
            resolution_type: None,
            resolution_notes: None,
            follow_up_required: false,
        };

        self.store.insert_exception(exception.clone()).await?;
        info!(
            exception_id = %exception.exception_id,
            exception_type = exception.exception_type.as_str(),
            "delivery exception reported"
        );

        Ok(exception)
    }

    /// Resolve an open exception. At most once per exception: a second call
    /// (or a concurrent loser) gets `AlreadyResolved` and the record keeps
    /// its original resolution.
    #[instrument(skip(self, notes), fields(exception_id = %exception_id, resolution_type = resolution_type.as_str()))]
    pub async fn resolve(
        &self,
        exception_id: Uuid,
        resolution_type: ResolutionType,
        notes: &str,
        follow_up_required: bool,
        notify_dispatcher: bool,
    ) -> Result<DeliveryException, AppError> {
        let trimmed = notes.trim();
        if trimmed.len() < self.config.min_notes_len {
            metrics::record_error("validation");
            return Err(AppError::validation(format!(
                "resolution notes too short: need at least {} characters",
                self.config.min_notes_len
            )));
        }

        let exception = self
            .store
            .claim_resolved(
                exception_id,
                ResolutionClaim {
                    resolved_at: Utc::now(),
                    resolution_type,
                    resolution_notes: trimmed.to_string(),
                    follow_up_required,
                },
            )
            .await?;

        metrics::record_exception_resolution(resolution_type.as_str());
        info!(order_id = %exception.order_id, "delivery exception resolved");

        // Fixed mapping from resolution to a forced order status; the other
        // resolutions leave the order to its own lifecycle.
        let forced_status = match resolution_type {
            ResolutionType::Returned => Some(OrderStatus::Returned),
            ResolutionType::Cancelled => Some(OrderStatus::Cancelled),
            ResolutionType::Resolved
            | ResolutionType::Rescheduled
            | ResolutionType::PartialResolution => None,
        };

        if let Some(status) = forced_status {
            if let Err(err) = self.orders.set_order_status(exception.order_id, status).await {
                warn!(
                    order_id = %exception.order_id,
                    error = %err,
                    "order status update failed; resolution stands"
                );
                metrics::record_sink_failure("order_status");
            }
        }

        if notify_dispatcher {
            let payload = json!({
                "exception_id": exception.exception_id,
                "order_id": exception.order_id,
                "exception_type": exception.exception_type.as_str(),
                "resolution_type": resolution_type.as_str(),
                "follow_up_required": follow_up_required,
            });
            if let Err(err) = self
                .notifications
                .notify(NotificationKind::ExceptionResolved, payload)
                .await
            {
                warn!(
                    exception_id = %exception.exception_id,
                    error = %err,
                    "dispatcher notification failed; resolution stands"
                );
                metrics::record_sink_failure("notification");
            }
        }

        Ok(exception)
    }

    pub async fn get_exception(&self, exception_id: Uuid) -> Result<DeliveryException, AppError> {
        self.store
            .get_exception(exception_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("exception {exception_id}")))
    }

    /// Open exceptions awaiting administrative resolution.
    pub async fn list_open(&self) -> Result<Vec<DeliveryException>, AppError> {
        self.store.list_open().await
    }
}
