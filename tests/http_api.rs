// HTTP API tests
// Exercises the axum router in-process with tower's oneshot
//
// Numan Thabit 2025 Nov

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::*;
use ethers::types::Address;
use ethers::utils::to_checksum;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use v2_quoter::control::AdmissionControl;
use v2_quoter::router::router::create_api_router;
use v2_quoter::router::Router;

const RESERVE: u128 = 1_000_000_000_000_000_000_000_000;

fn app(router: Router) -> axum::Router {
    create_api_router(Arc::new(router))
}

async fn post(app: axum::Router, uri: &str, body: Body) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn quote_json(token_in: &str, token_out: &str, amount: &str) -> Body {
    Body::from(
        json!({
            "tokenInChainId": 8453,
            "tokenIn": token_in,
            "tokenOutChainId": 8453,
            "tokenOut": token_out,
            "amount": amount,
            "type": "EXACT_INPUT",
        })
        .to_string(),
    )
}

fn bridged_ledger() -> MockLedger {
    MockLedger::base_tokens()
        .with_pair(USDC, WETH, Address::repeat_byte(0xa2), RESERVE, RESERVE)
        .with_pair(WETH, DAI, Address::repeat_byte(0xa3), RESERVE, RESERVE)
}

#[tokio::test]
async fn health_is_ok() {
    let response = app(router_with(Arc::new(MockLedger::default())))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn quote_returns_classic_payload() {
    let ledger = Arc::new(bridged_ledger());
    let expected = ledger.expected_out(1_000_000, &[USDC, WETH, DAI]);

    let (status, body) = post(
        app(router_with(ledger)),
        "/api/v1/quote",
        quote_json(USDC, DAI, "1000000"),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["routing"], "CLASSIC");
    assert_eq!(body["allQuotes"], json!([]));
    let quote = &body["quote"];
    assert_eq!(quote["amount"], "1000000");
    assert_eq!(quote["quote"], expected.to_string());
    assert_eq!(quote["blockNumber"], BLOCK_NUMBER.to_string());
    assert_eq!(quote["gasPriceWei"], GAS_PRICE_WEI.to_string());
    assert_eq!(quote["gasUseEstimateUSD"], "");

    let legs = quote["route"][0].as_array().unwrap();
    assert_eq!(legs.len(), 2);
    assert_eq!(legs[0]["tokenIn"]["address"], USDC);
    assert_eq!(legs[0]["tokenOut"]["symbol"], "WETH");
    assert_eq!(legs[1]["tokenOut"]["address"], DAI);
    assert_eq!(legs[0]["amountOut"], legs[1]["amountIn"]);
    assert_eq!(legs[1]["amountOut"], quote["quote"]);
}

#[tokio::test]
async fn legacy_quote_path_is_served() {
    let (status, body) = post(
        app(router_with(Arc::new(bridged_ledger()))),
        "/quote",
        quote_json(USDC, DAI, "1000000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["routing"], "CLASSIC");
}

#[tokio::test]
async fn invalid_request_is_bad_request() {
    let ledger = Arc::new(bridged_ledger());
    let (status, body) = post(
        app(router_with(ledger.clone())),
        "/api/v1/quote",
        quote_json(USDC, DAI, "12abc"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("amount"), "{body}");
    assert_eq!(ledger.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (status, body) = post(
        app(router_with(Arc::new(bridged_ledger()))),
        "/api/v1/quote",
        Body::from("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request"));
}

#[tokio::test]
async fn no_route_is_bad_request() {
    let (status, body) = post(
        app(router_with(Arc::new(MockLedger::base_tokens()))),
        "/api/v1/quote",
        quote_json(USDC, DAI, "1000000"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no route exists");
}

#[tokio::test]
async fn ledger_failure_is_bad_gateway() {
    let ledger = Arc::new(bridged_ledger());
    ledger.fail("resolve_pair");

    let (status, body) = post(
        app(router_with(ledger)),
        "/api/v1/quote",
        quote_json(USDC, DAI, "1000000"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("ledger unavailable"));
}

#[tokio::test]
async fn slow_ledger_hits_the_deadline() {
    let ledger = Arc::new(bridged_ledger().with_latency(Duration::from_secs(5)));
    let admission = AdmissionControl::new(4, Duration::from_millis(50));

    let (status, body) = post(
        app(router_with_admission(ledger, admission)),
        "/api/v1/quote",
        quote_json(USDC, DAI, "1000000"),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().unwrap().contains("deadline"));
}

#[tokio::test]
async fn pair_addresses_resolve_in_request_order() {
    let ledger = Arc::new(bridged_ledger());
    let body = Body::from(
        json!({
            "chainId": 8453,
            "tokens": [
                [USDC, WETH],
                [{ "address": USDC }, { "_checksummedAddress": DAI }],
                [WETH.to_lowercase(), DAI],
            ],
        })
        .to_string(),
    );

    let (status, body) = post(app(router_with(ledger)), "/api/v1/pair_addresses", body).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["tokens"], json!([USDC, WETH]));
    assert_eq!(
        entries[0]["liquidityToken"],
        to_checksum(&Address::repeat_byte(0xa2), None)
    );
    assert_eq!(
        entries[1]["liquidityToken"],
        to_checksum(&Address::zero(), None)
    );
    assert_eq!(
        entries[2]["liquidityToken"],
        to_checksum(&Address::repeat_byte(0xa3), None)
    );
}

#[tokio::test]
async fn pair_addresses_reject_unknown_chain() {
    let body = Body::from(json!({ "chainId": 1, "tokens": [[USDC, WETH]] }).to_string());
    let (status, body) = post(
        app(router_with(Arc::new(bridged_ledger()))),
        "/api/v1/pair_addresses",
        body,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unsupported chain 1"));
}

#[tokio::test]
async fn metrics_expose_quote_outcomes() {
    let router = app(router_with(Arc::new(bridged_ledger())));
    let (status, _) = post(
        router.clone(),
        "/api/v1/quote",
        quote_json(USDC, DAI, "1000000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();
    assert!(text.contains("quoter_quote_outcomes_total"), "{text}");
}

#[tokio::test]
async fn unknown_chain_ids_share_one_metric_series() {
    let router = app(router_with(Arc::new(bridged_ledger())));
    for chain_id in 1_000_000u64..1_000_050 {
        let body = Body::from(
            json!({
                "tokenInChainId": chain_id,
                "tokenIn": USDC,
                "tokenOut": DAI,
                "amount": "1000000",
                "type": "EXACT_INPUT",
            })
            .to_string(),
        );
        let (status, _) = post(router.clone(), "/api/v1/quote", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();

    let chains: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("quoter_quote_outcomes_total{"))
        .filter_map(|line| line.split("chain=\"").nth(1))
        .filter_map(|rest| rest.split('"').next())
        .collect();
    assert!(chains.contains(&"unsupported"), "{text}");
    for chain in chains {
        assert!(
            ["8453", "84531", "unknown", "unsupported"].contains(&chain),
            "unexpected chain label {chain}"
        );
    }
}
