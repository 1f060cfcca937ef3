use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::entities::category,
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    routes::api::upload::MultipartForm,
    services::ServiceContext,
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add-category", post(add_category))
        .route("/get-all-categories", get(get_all_categories))
        .route("/update-category/{category_id}", put(update_category))
        .route("/delete-category/{category_id}", delete(delete_category))
        .with_state(state)
}

async fn add_category(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    multipart: Multipart,
) -> ApiResult<category::Model> {
    let form = MultipartForm::read(multipart).await?;
    let name = form.text_required("name")?;
    let image = form.file_required("image")?;

    let services = ServiceContext::from_state(&state);
    let (category, created) = services
        .catalog(&state)
        .add_category(name, image.to_image_upload())
        .await?;

    if created {
        JsonApiResponse::created("Category added successfully", category)
    } else {
        JsonApiResponse::ok_message("Category already exists", category)
    }
}

async fn get_all_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<category::Model>> {
    let services = ServiceContext::from_state(&state);
    let categories = services.catalog(&state).list_categories().await?;
    JsonApiResponse::ok(categories)
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Path(category_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<category::Model> {
    let form = MultipartForm::read(multipart).await?;
    let name = form.text("name").map(str::to_string);
    let upload = form.file("image").map(|file| file.to_image_upload());

    let services = ServiceContext::from_state(&state);
    let category = services
        .catalog(&state)
        .update_category(&category_id, name, upload)
        .await?;

    JsonApiResponse::ok_message("Category updated successfully", category)
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let services = ServiceContext::from_state(&state);
    services.catalog(&state).delete_category(&category_id).await?;
    JsonApiResponse::message("Category deleted successfully")
}
