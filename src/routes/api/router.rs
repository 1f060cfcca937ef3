use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{address, cart, category, order, product, subcategory, user, webhook};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/user", user::router(state.clone()))
        .nest("/category", category::router(state.clone()))
        .nest("/subcategory", subcategory::router(state.clone()))
        .nest("/product", product::router(state.clone()))
        .nest("/cart", cart::router(state.clone()))
        .nest("/address", address::router(state.clone()))
        .nest("/order", order::router(state.clone()))
        .nest("/webhook", webhook::router(state))
}
