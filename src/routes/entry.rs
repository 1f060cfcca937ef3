use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{response::ApiResult, response::JsonApiResponse, state::AppState};

use super::api;

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(greeting))
        .nest(API_PREFIX, api::router(state))
}

async fn greeting() -> ApiResult<serde_json::Value> {
    JsonApiResponse::message("Greetings user! Welcome to the BlinkMart endpoint!")
}
