use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::entities::cart_item,
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::cart_service::CartLine,
    services::ServiceContext,
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/remove", post(remove_from_cart))
        .route("/clear", post(clear_cart))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub cart_item_id: Uuid,
    #[serde(default)]
    pub all: bool,
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
) -> ApiResult<Vec<CartLine>> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let lines = services.cart().list_items(&user_id).await?;
    JsonApiResponse::ok(lines)
}

async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<AddToCartRequest>,
) -> ApiResult<cart_item::Model> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let line = services
        .cart()
        .add_item(&user_id, &body.product_id, body.quantity)
        .await?;
    JsonApiResponse::ok_message("Product added to cart successfully", line)
}

async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<RemoveFromCartRequest>,
) -> ApiResult<serde_json::Value> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let remaining = services
        .cart()
        .remove_item(&user_id, &body.cart_item_id, body.all)
        .await?;

    JsonApiResponse::ok_message(
        "Product removed from cart successfully",
        serde_json::json!({ "cartItem": remaining }),
    )
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
) -> ApiResult<serde_json::Value> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let removed = services.cart().clear(&user_id).await?;

    if removed == 0 {
        return JsonApiResponse::message("Cart is already empty");
    }
    JsonApiResponse::ok_message(
        "Cart cleared successfully",
        serde_json::json!({ "itemsRemoved": removed }),
    )
}
