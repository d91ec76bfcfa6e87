//! Domain models for receivables-service.

#![allow(clippy::should_implement_trait)]

pub mod exception;
pub mod invoice;
pub mod payment;

pub use exception::{
    DeliveryException, ExceptionType, NewDeliveryException, OrderStatus, ResolutionClaim,
    ResolutionType,
};
pub use invoice::{ArSummary, Invoice, InvoiceStatus};
pub use payment::{
    BatchFailure, BatchOutcome, FailureReason, NewPayment, Payment, PaymentMethod, RemittanceBatch,
};
