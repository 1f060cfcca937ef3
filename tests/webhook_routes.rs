use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    middleware, Router,
};
use hmac::Mac;
use serde_json::json;
use tower::ServiceExt;

use blinkmart::{
    middleware::{catch_panic_layer, json_error_middleware},
    routes::API_PREFIX,
    test_helpers::test_router,
};

const SECRET: &[u8] = b"webhook-routes-secret";
const WEBHOOK_SECRET: &str = "whsec_test";

fn app() -> Router {
    test_router(SECRET)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

fn sign(payload: &[u8]) -> String {
    let mut mac = <hmac::Hmac<sha2::Sha256> as Mac>::new_from_slice(WEBHOOK_SECRET.as_bytes())
        .expect("hmac accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

async fn deliver(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app().oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

fn webhook_request(payload: &[u8], signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("{API_PREFIX}/webhook/payment"))
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-webhook-signature", signature);
    }
    builder.body(Body::from(payload.to_vec())).unwrap()
}

#[tokio::test]
async fn missing_signature_is_acknowledged_but_not_processed() {
    let payload = json!({ "event": "payment.captured" }).to_string();

    let (status, json) = deliver(webhook_request(payload.as_bytes(), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Webhook received but signature missing");
}

#[tokio::test]
async fn invalid_signature_is_acknowledged_but_not_processed() {
    let payload = json!({ "event": "payment.captured" }).to_string();

    // The mock connection has no results queued; touching the database
    // would fail the request, so a 200 here proves the event was dropped.
    let (status, json) = deliver(webhook_request(payload.as_bytes(), Some("deadbeef"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Webhook signature verification failed");
}

#[tokio::test]
async fn malformed_payload_is_acknowledged_with_processing_errors() {
    let payload = b"not json at all";

    let (status, json) = deliver(webhook_request(payload, Some(&sign(payload)))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Webhook received with processing errors");
}

#[tokio::test]
async fn unhandled_event_is_acknowledged() {
    let payload = json!({ "event": "payment.downtime.started" }).to_string();

    let (status, json) = deliver(webhook_request(
        payload.as_bytes(),
        Some(&sign(payload.as_bytes())),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Webhook processed successfully");
}
