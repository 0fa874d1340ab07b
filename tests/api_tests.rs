mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use common::{build_aggregator, build_test_app, make_token_event, WALLET_A};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = build_test_app(build_aggregator(&[]));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn metrics_endpoint_renders_prometheus_payload() {
    let app = build_test_app(build_aggregator(&[]));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_list_reflects_aggregator_state() {
    let agg = build_aggregator(&[]);
    agg.ingest_new_token(make_token_event("mint_a", "Foo", "FOO", "creator_1"))
        .await;

    let app = build_test_app(agg);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tokens")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["symbol"], "FOO");
}

#[tokio::test]
async fn token_detail_returns_404_for_unknown_mint() {
    let app = build_test_app(build_aggregator(&[]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tokens/unknown_mint")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wallet_tracking_round_trip() {
    let agg = build_aggregator(&[]);
    let app = build_test_app(agg);

    // Track a wallet
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/wallets")
                .header("content-type", "application/json")
                .body(Body::from(format!(
                    r#"{{"address": "{WALLET_A}", "display_name": "Insider"}}"#
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate is rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/wallets")
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"address": "{WALLET_A}"}}"#)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Listed
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/wallets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["display_name"], "Insider");

    // Untrack
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/wallets/{WALLET_A}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second removal is a 404
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/wallets/{WALLET_A}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_address_is_a_bad_request() {
    let app = build_test_app(build_aggregator(&[]));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/wallets")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"address": "not-a-valid-address"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn dashboard_summary_counts_collections() {
    let agg = build_aggregator(&["whale_1"]);
    agg.ingest_new_token(make_token_event("mint_a", "Foo", "FOO", "creator_1"))
        .await;

    let app = build_test_app(agg);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tokens"], 1);
    assert_eq!(body["trades"], 0);
    assert_eq!(body["tracked_wallets"], 0);
}
