//! Payment ledger integration tests.

mod common;

use common::spawn_app;
use receivables_service::models::{NewPayment, PaymentMethod};
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;

fn new_payment(collector_id: Uuid, amount: Decimal, method: PaymentMethod) -> NewPayment {
    NewPayment {
        order_id: Uuid::new_v4(),
        amount,
        method,
        collector_id,
        collector_name: "Dario Cruz".to_string(),
    }
}

#[tokio::test]
async fn record_payment_starts_unreconciled() {
    let app = spawn_app();
    let collector = Uuid::new_v4();

    let payment = app
        .ledger
        .record_payment(new_payment(collector, Decimal::new(50000, 2), PaymentMethod::Cash))
        .await
        .expect("record_payment");

    assert_eq!(payment.amount, Decimal::new(50000, 2));
    assert_eq!(payment.method, PaymentMethod::Cash);
    assert!(!payment.reconciled);
    assert!(payment.reconciled_at.is_none());
    assert!(payment.reconciliation_notes.is_none());

    let stored = app.ledger.get_payment(payment.payment_id).await.unwrap();
    assert_eq!(stored.payment_id, payment.payment_id);
}

#[tokio::test]
async fn record_payment_rejects_non_positive_amount() {
    let app = spawn_app();
    let collector = Uuid::new_v4();

    let zero = app
        .ledger
        .record_payment(new_payment(collector, Decimal::ZERO, PaymentMethod::Cash))
        .await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let negative = app
        .ledger
        .record_payment(new_payment(collector, Decimal::new(-100, 2), PaymentMethod::GCash))
        .await;
    assert!(matches!(negative, Err(AppError::Validation(_))));

    // nothing was appended
    let unreconciled = app.ledger.list_unreconciled(None).await.unwrap();
    assert!(unreconciled.is_empty());
}

#[tokio::test]
async fn mark_reconciled_sets_provenance_once() {
    let app = spawn_app();
    let collector = Uuid::new_v4();

    let payment = app
        .ledger
        .record_payment(new_payment(collector, Decimal::new(30000, 2), PaymentMethod::Maya))
        .await
        .unwrap();

    let reconciled = app
        .ledger
        .mark_reconciled(payment.payment_id, "Remittance confirmed")
        .await
        .expect("mark_reconciled");

    assert!(reconciled.reconciled);
    assert!(reconciled.reconciled_at.is_some());
    assert_eq!(
        reconciled.reconciliation_notes.as_deref(),
        Some("Remittance confirmed")
    );

    // at-most-once: the second attempt is rejected and the record is unchanged
    let second = app
        .ledger
        .mark_reconciled(payment.payment_id, "Second attempt")
        .await;
    assert!(matches!(
        second,
        Err(AppError::AlreadyReconciled { payment_id }) if payment_id == payment.payment_id
    ));

    let stored = app.ledger.get_payment(payment.payment_id).await.unwrap();
    assert_eq!(stored.reconciled_at, reconciled.reconciled_at);
    assert_eq!(
        stored.reconciliation_notes.as_deref(),
        Some("Remittance confirmed")
    );
}

#[tokio::test]
async fn mark_reconciled_unknown_payment_returns_not_found() {
    let app = spawn_app();

    let result = app.ledger.mark_reconciled(Uuid::new_v4(), "notes").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn list_unreconciled_orders_by_recorded_at_and_filters_by_collector() {
    let app = spawn_app();
    let dario = Uuid::new_v4();
    let elena = Uuid::new_v4();

    let first = app
        .ledger
        .record_payment(new_payment(dario, Decimal::new(10000, 2), PaymentMethod::Cash))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let second = app
        .ledger
        .record_payment(new_payment(elena, Decimal::new(20000, 2), PaymentMethod::GCash))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let third = app
        .ledger
        .record_payment(new_payment(dario, Decimal::new(30000, 2), PaymentMethod::Check))
        .await
        .unwrap();

    let all = app.ledger.list_unreconciled(None).await.unwrap();
    let ids: Vec<_> = all.iter().map(|p| p.payment_id).collect();
    assert_eq!(ids, vec![first.payment_id, second.payment_id, third.payment_id]);

    let darios = app.ledger.list_unreconciled(Some(dario)).await.unwrap();
    let ids: Vec<_> = darios.iter().map(|p| p.payment_id).collect();
    assert_eq!(ids, vec![first.payment_id, third.payment_id]);
}

#[tokio::test]
async fn list_unreconciled_excludes_reconciled_payments() {
    let app = spawn_app();
    let collector = Uuid::new_v4();

    let kept = app
        .ledger
        .record_payment(new_payment(collector, Decimal::new(10000, 2), PaymentMethod::Cash))
        .await
        .unwrap();
    let confirmed = app
        .ledger
        .record_payment(new_payment(collector, Decimal::new(20000, 2), PaymentMethod::Cash))
        .await
        .unwrap();

    app.ledger
        .mark_reconciled(confirmed.payment_id, "cash drop 2026-08-24")
        .await
        .unwrap();

    let unreconciled = app.ledger.list_unreconciled(Some(collector)).await.unwrap();
    assert_eq!(unreconciled.len(), 1);
    assert_eq!(unreconciled[0].payment_id, kept.payment_id);
}

#[tokio::test]
async fn list_payments_for_order_returns_all_states() {
    let app = spawn_app();
    let collector = Uuid::new_v4();
    let order_id = Uuid::new_v4();

    let mut input = new_payment(collector, Decimal::new(15000, 2), PaymentMethod::Cash);
    input.order_id = order_id;
    let first = app.ledger.record_payment(input).await.unwrap();

    let mut input = new_payment(collector, Decimal::new(5000, 2), PaymentMethod::GCash);
    input.order_id = order_id;
    let second = app.ledger.record_payment(input).await.unwrap();

    app.ledger
        .mark_reconciled(first.payment_id, "confirmed at drop-off")
        .await
        .unwrap();

    let payments = app.ledger.list_payments_for_order(order_id).await.unwrap();
    assert_eq!(payments.len(), 2);
    assert!(payments.iter().any(|p| p.payment_id == first.payment_id && p.reconciled));
    assert!(payments.iter().any(|p| p.payment_id == second.payment_id && !p.reconciled));
}
