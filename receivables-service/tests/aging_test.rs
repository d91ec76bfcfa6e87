//! Invoice aging and AR summary tests.

mod common;

use chrono::{Duration, Utc};
use common::spawn_app;
use receivables_service::config::AgingConfig;
use receivables_service::models::{Invoice, InvoiceStatus};
use receivables_service::services::{compute_ar_summary, overdue_invoices, InvoiceStore};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Invoice issued `age_days` ago with a 30 day term.
fn invoice(age_days: i64, total_cents: i64, paid_cents: i64) -> Invoice {
    let now = Utc::now();
    let issued_at = now - Duration::days(age_days);
    Invoice {
        invoice_id: Uuid::new_v4(),
        store_id: Uuid::new_v4(),
        store_name: "Aling Nena's Sari-Sari".to_string(),
        total_amount: Decimal::new(total_cents, 2),
        paid_amount: Decimal::new(paid_cents, 2),
        issued_at,
        due_at: issued_at + Duration::days(30),
    }
}

#[test]
fn summary_partitions_by_age() {
    let invoices = vec![
        invoice(5, 100000, 0),
        invoice(45, 200000, 0),
        invoice(75, 300000, 0),
        invoice(120, 400000, 0),
    ];

    let summary = compute_ar_summary(&invoices, Utc::now(), &AgingConfig::default());

    assert_eq!(summary.current, Decimal::new(100000, 2));
    assert_eq!(summary.bucket_31_to_60, Decimal::new(200000, 2));
    assert_eq!(summary.bucket_61_to_90, Decimal::new(300000, 2));
    assert_eq!(summary.bucket_90_plus, Decimal::new(400000, 2));
    assert_eq!(summary.total_outstanding, Decimal::new(1000000, 2));
    assert_eq!(summary.total_invoices, 4);
}

#[test]
fn summary_buckets_are_inclusive_at_the_upper_boundary() {
    // exactly 30, 60 and 90 days old
    let invoices = vec![
        invoice(30, 100000, 0),
        invoice(60, 200000, 0),
        invoice(90, 300000, 0),
        invoice(91, 400000, 0),
    ];

    let summary = compute_ar_summary(&invoices, Utc::now(), &AgingConfig::default());

    assert_eq!(summary.current, Decimal::new(100000, 2));
    assert_eq!(summary.bucket_31_to_60, Decimal::new(200000, 2));
    assert_eq!(summary.bucket_61_to_90, Decimal::new(300000, 2));
    assert_eq!(summary.bucket_90_plus, Decimal::new(400000, 2));
}

#[test]
fn summary_skips_paid_invoices_but_counts_them() {
    let invoices = vec![
        invoice(45, 100000, 100000),
        // overpayment never goes negative
        invoice(45, 100000, 150000),
        invoice(45, 100000, 0),
    ];

    let summary = compute_ar_summary(&invoices, Utc::now(), &AgingConfig::default());

    assert_eq!(summary.total_outstanding, Decimal::new(100000, 2));
    assert_eq!(summary.bucket_31_to_60, Decimal::new(100000, 2));
    assert_eq!(summary.overdue_count, 1);
    assert_eq!(summary.total_invoices, 3);
}

#[test]
fn summary_buckets_the_remaining_balance_of_partial_payments() {
    let invoices = vec![invoice(75, 500000, 200000)];

    let summary = compute_ar_summary(&invoices, Utc::now(), &AgingConfig::default());

    assert_eq!(summary.total_outstanding, Decimal::new(300000, 2));
    assert_eq!(summary.bucket_61_to_90, Decimal::new(300000, 2));
    assert_eq!(summary.current, Decimal::ZERO);
}

#[test]
fn summary_over_empty_input_is_zeroed() {
    let summary = compute_ar_summary(&[], Utc::now(), &AgingConfig::default());

    assert_eq!(summary.total_outstanding, Decimal::ZERO);
    assert_eq!(summary.overdue_count, 0);
    assert_eq!(summary.total_invoices, 0);
}

#[test]
fn summary_respects_configured_boundaries() {
    let config = AgingConfig {
        current_max_days: 7,
        tier_two_max_days: 14,
        tier_three_max_days: 21,
    };
    let invoices = vec![invoice(10, 100000, 0), invoice(25, 200000, 0)];

    let summary = compute_ar_summary(&invoices, Utc::now(), &config);

    assert_eq!(summary.bucket_31_to_60, Decimal::new(100000, 2));
    assert_eq!(summary.bucket_90_plus, Decimal::new(200000, 2));
}

#[test]
fn overdue_list_sorts_most_overdue_first_and_skips_paid() {
    let now = Utc::now();
    let old = invoice(80, 100000, 0);
    let older = invoice(120, 200000, 0);
    let paid = invoice(120, 300000, 300000);
    let pending = invoice(5, 400000, 0);

    let overdue = overdue_invoices(
        &[old.clone(), older.clone(), paid, pending],
        now,
    );

    let ids: Vec<_> = overdue.iter().map(|i| i.invoice_id).collect();
    assert_eq!(ids, vec![older.invoice_id, old.invoice_id]);
}

#[test]
fn status_is_derived_from_amounts_and_due_date() {
    let now = Utc::now();
    assert_eq!(invoice(5, 100000, 0).status_as_of(now), InvoiceStatus::Pending);
    assert_eq!(invoice(45, 100000, 0).status_as_of(now), InvoiceStatus::Overdue);
    assert_eq!(invoice(45, 100000, 100000).status_as_of(now), InvoiceStatus::Paid);
}

// Scenario: a 65 day old unpaid invoice shows up in the 61-90 bucket and
// on the overdue list.
#[tokio::test]
async fn aging_service_reports_over_the_store() {
    let app = spawn_app();
    let now = Utc::now();

    let stale = invoice(65, 750000, 0);
    let settled = invoice(65, 500000, 500000);
    app.store.upsert_invoice(stale.clone()).await.unwrap();
    app.store.upsert_invoice(settled).await.unwrap();

    let summary = app.aging.ar_summary(now).await.unwrap();
    assert_eq!(summary.bucket_61_to_90, Decimal::new(750000, 2));
    assert_eq!(summary.total_outstanding, Decimal::new(750000, 2));
    assert_eq!(summary.overdue_count, 1);
    assert_eq!(summary.total_invoices, 2);

    let overdue = app.aging.overdue(now).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].invoice_id, stale.invoice_id);
}
