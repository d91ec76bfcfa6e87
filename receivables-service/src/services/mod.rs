//! Services module for receivables-service.

pub mod aging;
pub mod database;
pub mod ledger;
pub mod metrics;
pub mod remittance;
pub mod resolution;
pub mod sinks;
pub mod store;

pub use aging::{compute_ar_summary, overdue_invoices, AgingService};
pub use database::Database;
pub use ledger::PaymentLedger;
pub use metrics::{get_metrics, init_metrics};
pub use remittance::{group_by_collector, RemittanceProcessor};
pub use resolution::ResolutionService;
pub use sinks::{
    LoggingNotificationSink, LoggingOrderStatusSink, NotificationKind, NotificationSink,
    OrderStatusSink,
};
pub use store::{ExceptionStore, InMemoryStore, InvoiceStore, PaymentStore};
