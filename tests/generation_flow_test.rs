mod common;

use common::Harness;
use fxdesk::domain::audit::{AuditAction, AuditEntity};
use fxdesk::domain::errors::RecommendationError;
use fxdesk::domain::recommendation::{
    AiRecommendationStatus, DraftSource, LegacyStatus, ModelDraft, RecommendationRequest,
    RiskLevel, SizingBasis, is_uuid_like,
};
use fxdesk::domain::trading::types::{Direction, PriceObservation};
use fxdesk::infrastructure::mock::MockRecommendationModel;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn model_draft(id: Option<&str>) -> ModelDraft {
    ModelDraft {
        id: id.map(str::to_string),
        instrument: "usd_jpy".to_string(),
        direction: Direction::Sell,
        confidence: 0.8,
        rationale: "BoJ intervention risk".to_string(),
        units: Some(dec!(3000)),
        expires_at: None,
    }
}

fn harness_with(draft: ModelDraft) -> Harness {
    Harness::with_model(Some(Arc::new(MockRecommendationModel::answering(draft))))
}

#[tokio::test]
async fn test_heuristic_generation_is_priced_and_stored() {
    let h = Harness::new();
    let mut request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
    request.time_horizon = "intraday".to_string();

    let priced = h.service.generate(request).await.unwrap();

    assert!(priced.source.is_heuristic());
    assert_eq!(priced.direction, Direction::Buy);
    assert_eq!(priced.units, dec!(100));
    assert_eq!(priced.sizing, SizingBasis::DraftDefault);
    assert_eq!(priced.entry_price, PriceObservation::Known(dec!(1.1000)));
    assert_eq!(priced.stop_loss, Some(dec!(1.0980)));
    assert_eq!(priced.take_profit, Some(dec!(1.1040)));
    let ttl = priced.expires_at - priced.context.assembled_at;
    assert_eq!(ttl, chrono::Duration::hours(4));

    let id = priced.id.unwrap();
    assert!(is_uuid_like(&id));
    let record = h.ai_record(&id).await;
    assert_eq!(record.status, AiRecommendationStatus::Pending);
    assert_eq!(record.stop_loss, Some(dec!(1.0980)));
    assert!(record.market_context.get("instruments").is_some());
    assert!(record.news_context.is_array());

    let mirror = h.mirror_of(&id).await;
    assert_ne!(mirror.id, id);
    assert_eq!(mirror.status, LegacyStatus::Pending);
    assert_eq!(mirror.confidence, Some(0.5));
    assert_eq!(mirror.units, dec!(100));

    assert_eq!(
        h.audit_actions(AuditEntity::AiRecommendation, &id).await,
        vec![AuditAction::Create]
    );
    assert_eq!(
        h.audit_actions(AuditEntity::Recommendation, &mirror.id).await,
        vec![AuditAction::Create]
    );
    assert!(h.metrics.render().contains("fxdesk_recommendations_generated_total"));
}

#[tokio::test]
async fn test_model_draft_is_used_and_non_uuid_id_replaced() {
    let h = harness_with(model_draft(Some("rec-42")));
    let request = RecommendationRequest::new(vec!["EUR_USD".to_string(), "USD_JPY".to_string()]);

    let priced = h.service.generate(request).await.unwrap();

    assert_eq!(
        priced.source,
        DraftSource::ModelDerived {
            model: "mock-model".to_string()
        }
    );
    assert_eq!(priced.instrument, "USD_JPY");
    assert_eq!(priced.direction, Direction::Sell);
    assert_eq!(priced.units, dec!(3000));
    // SELL JPY pair, medium risk: 20 pips of 0.01 around the 150.00 mid
    assert_eq!(priced.stop_loss, Some(dec!(150.20)));
    assert_eq!(priced.take_profit, Some(dec!(149.60)));

    let id = priced.id.unwrap();
    assert_ne!(id, "rec-42");
    assert!(is_uuid_like(&id));
}

#[tokio::test]
async fn test_uuid_supplied_by_model_is_kept() {
    let supplied = "0F8FAD5B-D9CB-469F-A165-70867728950E";
    let h = harness_with(model_draft(Some(supplied)));
    let request = RecommendationRequest::new(vec!["USD_JPY".to_string()]);

    let priced = h.service.generate(request).await.unwrap();

    assert_eq!(priced.id.as_deref(), Some("0f8fad5b-d9cb-469f-a165-70867728950e"));
}

#[tokio::test]
async fn test_model_failure_falls_back_to_heuristic() {
    let h = Harness::with_model(Some(Arc::new(MockRecommendationModel::failing())));
    let request = RecommendationRequest::new(vec!["GBP_USD".to_string()]);

    let priced = h.service.generate(request).await.unwrap();

    assert!(priced.source.is_heuristic());
    assert_eq!(priced.instrument, "GBP_USD");
    assert_eq!(priced.confidence, 0.5);
}

#[tokio::test]
async fn test_risk_based_sizing_uses_account_equity() {
    let h = Harness::new();
    h.broker.set_equity(dec!(10000)).await;
    let mut request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
    request.risk_fraction = Some(dec!(0.01));

    let priced = h.service.generate(request).await.unwrap();

    // 10000 * 0.01 / (20 pips * 0.0001)
    assert_eq!(priced.units, dec!(50000));
    assert_eq!(priced.sizing, SizingBasis::RiskBased);
}

#[tokio::test]
async fn test_explicit_units_win_over_risk_sizing() {
    let h = Harness::new();
    let mut request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
    request.risk_fraction = Some(dec!(0.01));
    request.units = Some(dec!(1234));
    request.risk_level = Some(RiskLevel::Low);

    let priced = h.service.generate(request).await.unwrap();

    assert_eq!(priced.units, dec!(1234));
    assert_eq!(priced.sizing, SizingBasis::Explicit);
    assert_eq!(priced.stop_loss, Some(dec!(1.0970)));
    assert_eq!(priced.take_profit, Some(dec!(1.1060)));
}

#[tokio::test]
async fn test_generation_without_any_price_has_no_bracket() {
    let h = Harness::new();
    let request = RecommendationRequest::new(vec!["AUD_CAD".to_string()]);

    let priced = h.service.generate(request).await.unwrap();

    assert_eq!(priced.entry_price, PriceObservation::Unknown);
    assert!(!priced.has_bracket());

    let id = priced.id.unwrap();
    h.service.accept(&id).await.unwrap();
    assert!(!h.broker.submissions().await[0].is_bracketed());
}

#[tokio::test]
async fn test_broker_price_outage_falls_back_to_snapshot() {
    let h = Harness::new();
    let request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
    h.broker.set_prices_unavailable(true);

    let priced = h.service.generate(request).await.unwrap();

    assert!(priced.entry_price.is_known());
    assert!(priced.has_bracket());
}

#[tokio::test]
async fn test_empty_instrument_list_is_invalid() {
    let h = Harness::new();

    let err = h
        .service
        .generate(RecommendationRequest::new(Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::InvalidRequest { .. }));
    assert!(h.ai.snapshot().await.is_empty());
    assert!(h.audit.all().await.is_empty());
}

#[tokio::test]
async fn test_fractional_units_are_rejected_before_storing() {
    let h = Harness::new();

    for units in [dec!(12.5), dec!(0.4)] {
        let mut request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
        request.units = Some(units);
        let err = h.service.generate(request).await.unwrap_err();
        assert!(matches!(err, RecommendationError::InvalidRequest { ref reason } if reason.contains("whole")));
    }

    assert!(h.ai.snapshot().await.is_empty());
    assert!(h.legacy.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_tiny_stop_with_risk_sizing_is_rejected() {
    let h = Harness::new();
    let mut request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
    request.risk_fraction = Some(dec!(0.01));
    request.stop_loss_pips = Some(dec!(0.0000000000000000000000001));

    let err = h.service.generate(request).await.unwrap_err();

    assert!(matches!(err, RecommendationError::InvalidRequest { .. }));
    assert!(h.ai.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_store_failure_is_fatal_for_generation() {
    let h = Harness::new();
    h.ai.faults().fail_on("create");

    let err = h.service.generate(RecommendationRequest::new(vec!["EUR_USD".to_string()])).await;

    assert!(matches!(err, Err(RecommendationError::Persistence { .. })));
    assert!(h.legacy.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_mirror_failure_is_logged_not_propagated() {
    let h = Harness::new();
    h.legacy.faults().fail_on("create");

    let id = h.generate_eur_usd().await;

    let listing = h.service.list(0).await.unwrap();
    assert_eq!(listing.ai.len(), 1);
    assert_eq!(listing.ai[0].id, id);
    assert!(listing.legacy.is_empty());
    assert_eq!(h.metrics.best_effort_failures("mirror"), 1.0);
}

#[tokio::test]
async fn test_listing_limits_and_soft_delete() {
    let h = Harness::new();
    let first = h.generate_eur_usd().await;
    let second = h.generate_eur_usd().await;
    let third = h.generate_eur_usd().await;

    let all = h.service.list(0).await.unwrap();
    assert_eq!(all.ai.len(), 3);
    assert_eq!(all.legacy.len(), 3);
    assert_eq!(all.ai[0].id, third);
    assert_eq!(h.service.list(2).await.unwrap().ai.len(), 2);
    assert_eq!(h.service.list(10_000).await.unwrap().ai.len(), 3);

    h.service.delete(&second).await.unwrap();
    let mirror = h.mirror_of(&first).await;
    assert_eq!(
        h.service.delete(&mirror.id).await.unwrap(),
        AuditEntity::Recommendation
    );

    let listing = h.service.list(0).await.unwrap();
    assert_eq!(listing.ai.len(), 2);
    assert!(listing.ai.iter().all(|r| r.id != second));
    assert_eq!(listing.legacy.len(), 2);

    let err = h.service.delete("missing").await.unwrap_err();
    assert!(matches!(err, RecommendationError::NotFound { .. }));
}
