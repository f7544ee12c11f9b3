//! Integration tests for the REST boundary and submission controller
//!
//! Runs the real HTTP client against a wiremock exchange so failure
//! classification is tested end to end: raw HTTP response in, typed
//! receipt out.

use chrono::{DateTime, Duration, Utc};
use std::time::Duration as StdDuration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use polyarb::common::types::{OrderPlan, OrderType, Side};
use polyarb::config::SubmissionConfig;
use polyarb::exchange::ClobRestClient;
use polyarb::execution::{
    OrderSubmissionController, SubmitFailReason, SubmitReceipt, SubmitSkipReason,
};
use polyarb::{BotError, TradeExecutor};

fn plan(market_id: &str) -> OrderPlan {
    OrderPlan {
        market_id: market_id.to_string(),
        token_id: format!("{}-yes", market_id),
        side: Side::Buy,
        order_type: OrderType::Fok,
        size_usd: 25.0,
        price: None,
    }
}

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn submission_config() -> SubmissionConfig {
    SubmissionConfig {
        min_interval_ms: 0,
        max_per_hour: 100,
        market_cooldown_ms: 0,
        duplicate_prevention_ms: 0,
        cloudflare_cooldown_ms: 600_000,
        auth_cooldown_ms: 1_800_000,
    }
}

async fn client_for(server: &MockServer) -> ClobRestClient {
    ClobRestClient::with_timeout(&server.uri(), StdDuration::from_secs(5)).unwrap()
}

#[test_log::test(tokio::test)]
async fn accepted_order_yields_submitted_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "orderId": "0xabc",
            "status": "matched",
            "takingAmount": "25.0",
            "makingAmount": "0"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut controller = OrderSubmissionController::new(submission_config());

    let order = plan("m1");
    let receipt = controller
        .submit(&order, t0(), || client.execute(&order))
        .await
        .unwrap();

    match receipt {
        SubmitReceipt::Submitted { order_id, fill } => {
            assert_eq!(order_id.as_deref(), Some("0xabc"));
            let fill = fill.expect("fill info should be extracted");
            assert_eq!(fill.taking_amount, "25.0");
        }
        other => panic!("expected Submitted, got {:?}", other),
    }
}

#[test_log::test(tokio::test)]
async fn cloudflare_challenge_blocks_every_market() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("cf-ray", "8abc123-EWR")
                .set_body_string("<html><title>Attention Required! | Cloudflare</title></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut controller = OrderSubmissionController::new(submission_config());

    let order = plan("m1");
    let receipt = controller
        .submit(&order, t0(), || client.execute(&order))
        .await
        .unwrap();
    assert!(matches!(
        receipt,
        SubmitReceipt::Failed {
            reason: SubmitFailReason::CloudflareBlock,
            blocked_until: Some(_),
        }
    ));

    // A different market within the cooldown gets skipped without another
    // HTTP call (wiremock would fail the expect(1) otherwise).
    let order = plan("m2");
    let receipt = controller
        .submit(&order, t0() + Duration::minutes(5), || client.execute(&order))
        .await
        .unwrap();
    assert!(matches!(
        receipt,
        SubmitReceipt::Skipped {
            reason: SubmitSkipReason::CloudflareBlock,
            ..
        }
    ));
}

#[test_log::test(tokio::test)]
async fn unauthorized_opens_auth_cooldown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut controller = OrderSubmissionController::new(submission_config());

    let order = plan("m1");
    let receipt = controller
        .submit(&order, t0(), || client.execute(&order))
        .await
        .unwrap();
    assert!(matches!(
        receipt,
        SubmitReceipt::Failed {
            reason: SubmitFailReason::AuthUnauthorized,
            ..
        }
    ));
    assert!(controller.auth_blocked_until().is_some());
}

#[test_log::test(tokio::test)]
async fn plain_server_error_propagates_unclassified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut controller = OrderSubmissionController::new(submission_config());

    let order = plan("m1");
    let result = controller
        .submit(&order, t0(), || client.execute(&order))
        .await;
    assert!(matches!(result, Err(BotError::Exchange(_))));
}

#[test_log::test(tokio::test)]
async fn fok_killed_order_classified_as_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "orderId": "0xdead",
            "status": "unmatched",
            "takingAmount": "0",
            "makingAmount": "0"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut controller = OrderSubmissionController::new(submission_config());

    let order = plan("m1");
    let receipt = controller
        .submit(&order, t0(), || client.execute(&order))
        .await
        .unwrap();
    assert!(matches!(
        receipt,
        SubmitReceipt::Failed {
            reason: SubmitFailReason::FokOrderKilled,
            ..
        }
    ));
}

#[test_log::test(tokio::test)]
async fn book_top_parses_best_levels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "market": "0xcond",
            "asset_id": "123",
            "bids": [{"price": "0.44", "size": "1200"}, {"price": "0.43", "size": "600"}],
            "asks": [{"price": "0.46", "size": "900"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let top = client.get_book_top("123").await.unwrap();
    assert_eq!(top.best_bid, Some(0.44));
    assert_eq!(top.best_ask, Some(0.46));
}

#[test_log::test(tokio::test)]
async fn empty_book_yields_one_sided_top() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "market": "0xcond",
            "asset_id": "123",
            "bids": [],
            "asks": [{"price": "0.46", "size": "900"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let top = client.get_book_top("123").await.unwrap();
    assert_eq!(top.best_bid, None);
    assert_eq!(top.best_ask, Some(0.46));
}
