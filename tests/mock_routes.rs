use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    middleware, Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use blinkmart::{
    auth::{
        jwt::{encode_token, make_access_claims, JwtKeys},
        Role,
    },
    middleware::{catch_panic_layer, json_error_middleware},
    routes::API_PREFIX,
    test_helpers::test_router,
};

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

fn app(secret: &[u8]) -> Router {
    test_router(secret)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

fn auth_header(secret: &[u8], roles: Vec<Role>) -> String {
    let claims = make_access_claims(&Uuid::new_v4(), roles, 3600);
    let keys = JwtKeys::from_secret(secret);
    let token = encode_token(&keys, &claims).expect("encode token");
    format!("Bearer {token}")
}

async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

#[tokio::test]
async fn cart_requires_access_token() {
    let secret = b"mock-routes-secret";
    let (status, json) = json_response(
        app(secret),
        Request::builder()
            .method("GET")
            .uri(api_path("/cart"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["errorMessage"], "Missing access token");
}

#[tokio::test]
async fn admin_route_rejects_user_token() {
    let secret = b"mock-routes-secret";
    let auth = auth_header(secret, vec![Role::User]);

    let (status, json) = json_response(
        app(secret),
        Request::builder()
            .method("DELETE")
            .uri(api_path(&format!("/category/delete-category/{}", Uuid::new_v4())))
            .header("authorization", auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["success"], false);
    assert_eq!(json["errorMessage"], "Missing required role");
}

#[tokio::test]
async fn access_token_cookie_is_accepted() {
    let secret = b"mock-routes-secret";
    let claims = make_access_claims(&Uuid::new_v4(), vec![Role::User], 3600);
    let keys = JwtKeys::from_secret(secret);
    let token = encode_token(&keys, &claims).expect("encode token");

    // Empty order rejects before any database work, which proves the cookie
    // cleared the guard.
    let (status, json) = json_response(
        app(secret),
        Request::builder()
            .method("POST")
            .uri(api_path("/order/place-cod-order"))
            .header("cookie", format!("access_token={token}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "products": [],
                    "deliveryAddressId": Uuid::new_v4(),
                    "subtotalAmount": 100.0,
                    "totalAmount": 100.0,
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["errorMessage"],
        "Order must contain at least one product"
    );
}

#[tokio::test]
async fn address_rejects_unknown_address_type() {
    let secret = b"mock-routes-secret";
    let auth = auth_header(secret, vec![Role::User]);

    let (status, json) = json_response(
        app(secret),
        Request::builder()
            .method("POST")
            .uri(api_path("/address/add-address"))
            .header("authorization", auth)
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "addressLine1": "12 Market Road",
                    "city": "Pune",
                    "state": "Maharashtra",
                    "country": "India",
                    "postalCode": "411001",
                    "mobile": "9876543210",
                    "addressType": "Castle",
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errorMessage"], "Invalid address type");
}

#[tokio::test]
async fn unknown_route_is_normalized_to_json_error() {
    let secret = b"mock-routes-secret";
    let (status, json) = json_response(
        app(secret),
        Request::builder()
            .method("GET")
            .uri(api_path("/unknown-route"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert!(!json["errorMessage"].as_str().unwrap_or("").is_empty());
}

#[tokio::test]
async fn greeting_route_answers_without_auth() {
    let secret = b"mock-routes-secret";
    let (status, json) = json_response(
        app(secret),
        Request::builder()
            .method("GET")
            .uri("/")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(!json["message"].as_str().unwrap_or("").is_empty());
}
