use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::entities::subcategory,
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    routes::api::upload::MultipartForm,
    services::ServiceContext,
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add-subcategory", post(add_subcategory))
        .route("/get-all-subcategories", get(get_all_subcategories))
        .route(
            "/get-subcategories-by-category/{category_id}",
            get(get_subcategories_by_category),
        )
        .route("/update-subcategory/{subcategory_id}", put(update_subcategory))
        .route("/delete-subcategory/{subcategory_id}", delete(delete_subcategory))
        .with_state(state)
}

async fn add_subcategory(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    multipart: Multipart,
) -> ApiResult<subcategory::Model> {
    let form = MultipartForm::read(multipart).await?;
    let name = form.text_required("name")?;
    let category_ids = form.id_list("categoryIds")?;
    let image = form.file_required("image")?;

    let services = ServiceContext::from_state(&state);
    let subcategory = services
        .catalog(&state)
        .add_subcategory(name, &category_ids, image.to_image_upload())
        .await?;

    JsonApiResponse::created("Subcategory added successfully", subcategory)
}

async fn get_all_subcategories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<subcategory::Model>> {
    let services = ServiceContext::from_state(&state);
    let subcategories = services.catalog(&state).list_subcategories().await?;
    JsonApiResponse::ok(subcategories)
}

async fn get_subcategories_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Vec<subcategory::Model>> {
    let services = ServiceContext::from_state(&state);
    let subcategories = services
        .catalog(&state)
        .list_subcategories_by_category(&category_id)
        .await?;
    JsonApiResponse::ok(subcategories)
}

async fn update_subcategory(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Path(subcategory_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<subcategory::Model> {
    let form = MultipartForm::read(multipart).await?;
    let name = form.text("name").map(str::to_string);
    let category_ids = match form.text("categoryIds") {
        Some(_) => Some(form.id_list("categoryIds")?),
        None => None,
    };
    let upload = form.file("image").map(|file| file.to_image_upload());

    let services = ServiceContext::from_state(&state);
    let subcategory = services
        .catalog(&state)
        .update_subcategory(&subcategory_id, name, category_ids, upload)
        .await?;

    JsonApiResponse::ok_message("Subcategory updated successfully", subcategory)
}

async fn delete_subcategory(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Path(subcategory_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let services = ServiceContext::from_state(&state);
    services
        .catalog(&state)
        .delete_subcategory(&subcategory_id)
        .await?;
    JsonApiResponse::message("Subcategory deleted successfully")
}
