//! Common test utilities for receivables-service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use receivables_service::config::{AgingConfig, ResolutionConfig};
use receivables_service::models::OrderStatus;
use receivables_service::services::{
    AgingService, InMemoryStore, NotificationKind, NotificationSink, OrderStatusSink,
    PaymentLedger, RemittanceProcessor, ResolutionService,
};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,receivables_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Order sink test double: records every request, optionally failing.
#[derive(Default)]
pub struct RecordingOrderSink {
    pub calls: Mutex<Vec<(Uuid, OrderStatus)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl OrderStatusSink for RecordingOrderSink {
    async fn set_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "order pipeline unavailable"
            )));
        }
        self.calls.lock().unwrap().push((order_id, status));
        Ok(())
    }
}

/// Notification sink test double: records every payload, optionally failing.
#[derive(Default)]
pub struct RecordingNotificationSink {
    pub calls: Mutex<Vec<(NotificationKind, serde_json::Value)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(
        &self,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "notification channel unavailable"
            )));
        }
        self.calls.lock().unwrap().push((kind, payload));
        Ok(())
    }
}

/// Test application wired over a shared in-memory store.
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub ledger: PaymentLedger,
    pub processor: RemittanceProcessor,
    pub aging: AgingService,
    pub resolution: ResolutionService,
    pub orders: Arc<RecordingOrderSink>,
    pub notifications: Arc<RecordingNotificationSink>,
}

/// Build a test application with default configuration.
pub fn spawn_app() -> TestApp {
    init_tracing();

    let store = Arc::new(InMemoryStore::new());
    let orders = Arc::new(RecordingOrderSink::default());
    let notifications = Arc::new(RecordingNotificationSink::default());

    let ledger = PaymentLedger::new(store.clone());
    let processor = RemittanceProcessor::new(ledger.clone());
    let aging = AgingService::new(store.clone(), AgingConfig::default());
    let resolution = ResolutionService::new(
        store.clone(),
        orders.clone(),
        notifications.clone(),
        ResolutionConfig::default(),
    );

    TestApp {
        store,
        ledger,
        processor,
        aging,
        resolution,
        orders,
        notifications,
    }
}
