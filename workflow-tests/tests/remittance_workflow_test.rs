//! End of day remittance workflow.
//!
//! Follows a full collection day: drivers record collections in the field,
//! the back office groups them per collector, and each collector's cash
//! drop is confirmed as a batch.

use rust_decimal::Decimal;
use uuid::Uuid;
use workflow_tests::{cash_collection, WorkflowTestContext};

use receivables_service::services::group_by_collector;

#[tokio::test]
async fn end_of_day_remittance() {
    let ctx = WorkflowTestContext::new();
    let dario = Uuid::new_v4();
    let elena = Uuid::new_v4();

    // Morning: collections come in from two drivers.
    for (collector, name, pesos) in [
        (dario, "Dario Cruz", 1500),
        (elena, "Elena Reyes", 2200),
        (dario, "Dario Cruz", 800),
        (elena, "Elena Reyes", 450),
    ] {
        ctx.ledger
            .record_payment(cash_collection(collector, name, pesos))
            .await
            .expect("record_payment");
    }

    // Cutoff: the back office pulls the remittance worksheet.
    let pending = ctx.ledger.list_unreconciled(None).await.unwrap();
    assert_eq!(pending.len(), 4);

    let batches = group_by_collector(&pending);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].collector_name, "Dario Cruz");
    assert_eq!(batches[0].total_expected, Decimal::new(230000, 2));
    assert_eq!(batches[1].collector_name, "Elena Reyes");
    assert_eq!(batches[1].total_expected, Decimal::new(265000, 2));

    // Dario drops his cash; his batch is confirmed in full.
    let outcome = ctx
        .processor
        .reconcile_batch(&batches[0].payment_ids, "EOD cash drop, counted and matched")
        .await
        .unwrap();
    assert_eq!(outcome.success_count, 2);
    assert!(outcome.is_clean());

    // Elena's collections are still pending; Dario's are done.
    let remaining = ctx.ledger.list_unreconciled(None).await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|p| p.collector_id == elena));

    // A re-submission of Dario's worksheet reports stale items instead of
    // double-counting the cash.
    let replay = ctx
        .processor
        .reconcile_batch(&batches[0].payment_ids, "duplicate worksheet submission")
        .await
        .unwrap();
    assert_eq!(replay.success_count, 0);
    assert_eq!(replay.fail_count, 2);
}

#[tokio::test]
async fn remittance_survives_a_concurrent_confirmation() {
    let ctx = WorkflowTestContext::new();
    let dario = Uuid::new_v4();

    let keep = ctx
        .ledger
        .record_payment(cash_collection(dario, "Dario Cruz", 1000))
        .await
        .unwrap();
    let raced = ctx
        .ledger
        .record_payment(cash_collection(dario, "Dario Cruz", 2000))
        .await
        .unwrap();

    // Two back-office sessions confirm overlapping batches at once.
    let a = {
        let processor = ctx.processor.clone();
        let ids = vec![keep.payment_id, raced.payment_id];
        tokio::spawn(async move { processor.reconcile_batch(&ids, "session A").await })
    };
    let b = {
        let processor = ctx.processor.clone();
        let ids = vec![raced.payment_id];
        tokio::spawn(async move { processor.reconcile_batch(&ids, "session B").await })
    };

    let outcome_a = a.await.unwrap().unwrap();
    let outcome_b = b.await.unwrap().unwrap();

    // Exactly one session wins the contested payment.
    assert_eq!(outcome_a.success_count + outcome_b.success_count, 2);
    assert_eq!(outcome_a.fail_count + outcome_b.fail_count, 1);

    // Both payments end up reconciled exactly once.
    let keep_after = ctx.ledger.get_payment(keep.payment_id).await.unwrap();
    let raced_after = ctx.ledger.get_payment(raced.payment_id).await.unwrap();
    assert!(keep_after.reconciled);
    assert!(raced_after.reconciled);
    assert!(ctx.ledger.list_unreconciled(None).await.unwrap().is_empty());
}
