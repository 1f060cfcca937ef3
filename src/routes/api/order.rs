use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::dao::PaginatedResponse,
    db::entities::order::{self, OrderLine},
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::order_service::OrderInput,
    services::ServiceContext,
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get-order-details", get(get_order_details))
        .route("/place-cod-order", post(place_cod_order))
        .route("/create-payment-order", post(create_payment_order))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub products: Vec<CheckoutLine>,
    pub delivery_address_id: Uuid,
    pub subtotal_amount: f64,
    pub total_amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

impl CheckoutRequest {
    fn into_input(self) -> OrderInput {
        OrderInput {
            lines: self
                .products
                .into_iter()
                .map(|line| OrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
            delivery_address_id: self.delivery_address_id,
            subtotal_amount: self.subtotal_amount,
            total_amount: self.total_amount,
        }
    }
}

async fn get_order_details(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let orders = services
        .order(&state)
        .list_orders(&user_id, query.page, query.page_size)
        .await?;
    JsonApiResponse::ok(orders)
}

async fn place_cod_order(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<CheckoutRequest>,
) -> ApiResult<order::Model> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let order = services
        .order(&state)
        .place_cod_order(&user_id, body.into_input())
        .await?;
    JsonApiResponse::created("Order placed successfully", order)
}

async fn create_payment_order(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<CheckoutRequest>,
) -> ApiResult<serde_json::Value> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let (order, payment_details) = services
        .order(&state)
        .create_payment_order(&user_id, body.into_input())
        .await?;

    JsonApiResponse::created(
        "Payment order created successfully",
        serde_json::json!({
            "order": order,
            "paymentDetails": payment_details,
        }),
    )
}
