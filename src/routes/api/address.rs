use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::entities::address::{self, AddressType},
    error::AppError,
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::address_service::AddressInput,
    services::ServiceContext,
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add-address", post(add_address))
        .route("/get-all-addresses", get(get_all_addresses))
        .route("/get-address/{address_id}", get(get_address))
        .route("/update-address/{address_id}", put(update_address))
        .route("/delete-address/{address_id}", delete(delete_address))
        .route("/set-default/{address_id}", patch(set_default_address))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[serde(default)]
    pub address_name: Option<String>,
    pub address_line_1: String,
    #[serde(default)]
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub mobile: String,
    #[serde(default)]
    pub address_type: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressRequest {
    fn into_input(self) -> Result<AddressInput, AppError> {
        let address_type = match self.address_type.as_deref() {
            None => AddressType::Home,
            Some(raw) => AddressType::try_from(raw)
                .map_err(|_| AppError::bad_request("Invalid address type"))?,
        };

        Ok(AddressInput {
            address_name: self.address_name.unwrap_or_default(),
            address_line_1: self.address_line_1,
            address_line_2: self.address_line_2,
            city: self.city,
            state: self.state,
            country: self.country,
            postal_code: self.postal_code,
            mobile: self.mobile,
            address_type,
            is_default: self.is_default,
        })
    }
}

async fn add_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<AddressRequest>,
) -> ApiResult<address::Model> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let address = services
        .address()
        .add_address(&user_id, body.into_input()?)
        .await?;
    JsonApiResponse::created("Address added successfully", address)
}

async fn get_all_addresses(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
) -> ApiResult<Vec<address::Model>> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let addresses = services.address().list_addresses(&user_id).await?;
    JsonApiResponse::ok(addresses)
}

async fn get_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(address_id): Path<Uuid>,
) -> ApiResult<address::Model> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let address = services.address().get_address(&user_id, &address_id).await?;
    JsonApiResponse::ok(address)
}

async fn update_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(address_id): Path<Uuid>,
    Json(body): Json<AddressRequest>,
) -> ApiResult<address::Model> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let address = services
        .address()
        .update_address(&user_id, &address_id, body.into_input()?)
        .await?;
    JsonApiResponse::ok_message("Address updated successfully", address)
}

async fn delete_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(address_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    services.address().remove_address(&user_id, &address_id).await?;
    JsonApiResponse::message("Address deleted successfully")
}

async fn set_default_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(address_id): Path<Uuid>,
) -> ApiResult<address::Model> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let address = services.address().set_default(&user_id, &address_id).await?;
    JsonApiResponse::ok_message("Default address updated", address)
}
