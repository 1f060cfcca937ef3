use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::dao::PaginatedResponse,
    db::entities::product,
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    routes::api::upload::MultipartForm,
    services::catalog_service::ProductInput,
    services::ServiceContext,
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add-product", post(add_product))
        .route("/get-products", get(get_products))
        .route("/get-product/{product_id}", get(get_product))
        .route(
            "/get-products-by-category/{category_id}",
            get(get_products_by_category),
        )
        .route(
            "/get-products-by-category-and-subcategory",
            get(get_products_by_category_and_subcategory),
        )
        .route("/update-product/{product_id}", put(update_product))
        .route("/delete-product/{product_id}", delete(delete_product))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySubcategoryQuery {
    pub category_id: Uuid,
    pub subcategory_id: Uuid,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

#[derive(Debug, Deserialize)]
pub struct ByCategoryQuery {
    #[serde(default = "default_page_size")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

/// Builds a `ProductInput` from a multipart form: text fields plus any
/// number of `images` file parts, uploaded before the product is persisted.
async fn product_input_from_form(
    state: &AppState,
    form: &MultipartForm,
) -> Result<ProductInput, crate::error::AppError> {
    let services = ServiceContext::from_state(state);
    let catalog = services.catalog(state);

    let mut image_urls = Vec::new();
    for file in form.files("images") {
        let url = catalog.upload_image(file.to_image_upload()).await?;
        image_urls.push(url);
    }

    let more_details = match form.text("moreDetails") {
        Some(raw) => serde_json::from_str(raw).map_err(|err| {
            crate::error::AppError::bad_request(format!("Invalid moreDetails JSON: {err}"))
        })?,
        None => serde_json::json!({}),
    };

    Ok(ProductInput {
        name: form.text_required("name")?.to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        image_urls,
        category_ids: form.id_list("categoryIds")?,
        subcategory_ids: form.id_list("subcategoryIds")?,
        unit: form.text_required("unit")?.to_string(),
        stock: parse_field(form, "stock")?,
        price: parse_field(form, "price")?,
        discount: form
            .text("discount")
            .map(|raw| raw.parse())
            .transpose()
            .map_err(|_| crate::error::AppError::bad_request("Invalid discount"))?
            .unwrap_or(0.0),
        more_details,
        publish: form
            .text("publish")
            .map(|raw| raw == "true" || raw == "1")
            .unwrap_or(true),
    })
}

fn parse_field<T: std::str::FromStr>(
    form: &MultipartForm,
    name: &str,
) -> Result<T, crate::error::AppError> {
    form.text_required(name)?
        .parse()
        .map_err(|_| crate::error::AppError::bad_request(format!("Invalid value for '{name}'")))
}

async fn add_product(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    multipart: Multipart,
) -> ApiResult<product::Model> {
    let form = MultipartForm::read(multipart).await?;
    let input = product_input_from_form(&state, &form).await?;

    let services = ServiceContext::from_state(&state);
    let created = services.catalog(&state).add_product(input).await?;
    JsonApiResponse::created("Product added successfully", created)
}

async fn get_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    let services = ServiceContext::from_state(&state);
    let products = services
        .catalog(&state)
        .search_products(query.page, query.page_size, query.search.as_deref())
        .await?;
    JsonApiResponse::ok(products)
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<product::Model> {
    let services = ServiceContext::from_state(&state);
    let product = services.catalog(&state).product_details(&product_id).await?;
    JsonApiResponse::ok(product)
}

async fn get_products_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
    Query(query): Query<ByCategoryQuery>,
) -> ApiResult<Vec<product::Model>> {
    let services = ServiceContext::from_state(&state);
    let products = services
        .catalog(&state)
        .products_by_category(&category_id, query.limit)
        .await?;
    JsonApiResponse::ok(products)
}

async fn get_products_by_category_and_subcategory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategorySubcategoryQuery>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    let services = ServiceContext::from_state(&state);
    let products = services
        .catalog(&state)
        .products_by_category_and_subcategory(
            &query.category_id,
            &query.subcategory_id,
            query.page,
            query.page_size,
        )
        .await?;
    JsonApiResponse::ok(products)
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Path(product_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<product::Model> {
    let form = MultipartForm::read(multipart).await?;
    let input = product_input_from_form(&state, &form).await?;

    let services = ServiceContext::from_state(&state);
    let updated = services
        .catalog(&state)
        .update_product(&product_id, input)
        .await?;
    JsonApiResponse::ok_message("Product updated successfully", updated)
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let services = ServiceContext::from_state(&state);
    services.catalog(&state).delete_product(&product_id).await?;
    JsonApiResponse::message("Product deleted successfully")
}
