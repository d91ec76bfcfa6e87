//! Cross-component workflow integration tests library.
//!
//! Provides test infrastructure for running end-to-end scenarios across the
//! receivables components. All services share one in-memory store so a
//! workflow exercises the same state a deployed process would.

use std::sync::Arc;
use std::sync::Once;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use receivables_service::config::{AgingConfig, ResolutionConfig};
use receivables_service::models::{ExceptionType, Invoice, NewDeliveryException, NewPayment, PaymentMethod};
use receivables_service::services::{
    AgingService, InMemoryStore, LoggingNotificationSink, LoggingOrderStatusSink, PaymentLedger,
    RemittanceProcessor, ResolutionService,
};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug,receivables_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Context for workflow tests with every component wired over one store.
pub struct WorkflowTestContext {
    pub store: Arc<InMemoryStore>,
    pub ledger: PaymentLedger,
    pub processor: RemittanceProcessor,
    pub aging: AgingService,
    pub resolution: ResolutionService,
}

impl WorkflowTestContext {
    /// Create a fresh context. Each test gets its own store for isolation.
    pub fn new() -> Self {
        init_tracing();

        let store = Arc::new(InMemoryStore::new());
        let ledger = PaymentLedger::new(store.clone());
        let processor = RemittanceProcessor::new(ledger.clone());
        let aging = AgingService::new(store.clone(), AgingConfig::default());
        let resolution = ResolutionService::new(
            store.clone(),
            Arc::new(LoggingOrderStatusSink),
            Arc::new(LoggingNotificationSink),
            ResolutionConfig::default(),
        );

        Self {
            store,
            ledger,
            processor,
            aging,
            resolution,
        }
    }
}

impl Default for WorkflowTestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A cash collection against a fresh order.
pub fn cash_collection(collector_id: Uuid, collector_name: &str, pesos: i64) -> NewPayment {
    NewPayment {
        order_id: Uuid::new_v4(),
        amount: Decimal::new(pesos * 100, 2),
        method: PaymentMethod::Cash,
        collector_id,
        collector_name: collector_name.to_string(),
    }
}

/// An invoice issued `age_days` ago on 30 day terms.
pub fn aged_invoice(
    store_name: &str,
    age_days: i64,
    total: Decimal,
    paid: Decimal,
    as_of: DateTime<Utc>,
) -> Invoice {
    let issued_at = as_of - Duration::days(age_days);
    Invoice {
        invoice_id: Uuid::new_v4(),
        store_id: Uuid::new_v4(),
        store_name: store_name.to_string(),
        total_amount: total,
        paid_amount: paid,
        issued_at,
        due_at: issued_at + Duration::days(30),
    }
}

/// A field-reported delivery exception.
pub fn reported_exception(order_id: Uuid, exception_type: ExceptionType) -> NewDeliveryException {
    NewDeliveryException {
        order_id,
        exception_type,
        description: "Reported from the field during the delivery run".to_string(),
        reported_by: "driver-3".to_string(),
    }
}
