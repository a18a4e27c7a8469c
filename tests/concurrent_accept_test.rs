mod common;

use common::Harness;
use fxdesk::domain::errors::RecommendationError;
use fxdesk::domain::recommendation::AiRecommendationStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_accepts_submit_one_order() {
    let h = Arc::new(Harness::new());
    let id = h.generate_eur_usd().await;
    h.broker
        .set_submit_delay(Some(Duration::from_millis(50)))
        .await;

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let h = h.clone();
        let id = id.clone();
        tasks.spawn(async move { h.service.accept(&id).await });
    }

    let mut executed = 0;
    let mut conflicts = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => executed += 1,
            Err(RecommendationError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(executed, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(h.broker.submissions().await.len(), 1);
    assert_eq!(h.trades.count().await, 1);
    assert_eq!(h.metrics.best_effort_failures("mark_executed"), 0.0);
}

#[tokio::test]
async fn test_cancelled_caller_still_reconciles() {
    let h = Harness::new();
    let id = h.generate_eur_usd().await;
    h.broker
        .set_submit_delay(Some(Duration::from_millis(200)))
        .await;

    let outcome = tokio::time::timeout(Duration::from_millis(20), h.service.accept(&id)).await;
    assert!(outcome.is_err(), "accept should still be waiting on the broker");

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(h.broker.submissions().await.len(), 1);
    assert_eq!(h.trades.count().await, 1);
    let record = h.ai_record(&id).await;
    assert_eq!(record.status, AiRecommendationStatus::Executed);
    assert_eq!(record.executed_trade_id.as_deref(), Some("1000"));
}

#[tokio::test]
async fn test_claim_blocks_accept_while_order_in_flight() {
    let h = Arc::new(Harness::new());
    let id = h.generate_eur_usd().await;
    h.broker
        .set_submit_delay(Some(Duration::from_millis(100)))
        .await;

    let first = {
        let h = h.clone();
        let id = id.clone();
        tokio::spawn(async move { h.service.accept(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Claimed but not yet filled
    assert_eq!(h.ai_record(&id).await.status, AiRecommendationStatus::Executed);
    let err = h.service.accept(&id).await.unwrap_err();
    assert!(matches!(err, RecommendationError::Conflict { .. }));

    first.await.unwrap().unwrap();
    assert_eq!(h.broker.submissions().await.len(), 1);
}
