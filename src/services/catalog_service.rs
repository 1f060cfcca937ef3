use std::sync::Arc;

use sea_orm::Set;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    clients::images::{ImageStore, IMAGE_MIMETYPE_LIST},
    db::dao::{CategoryDao, DaoBase, PaginatedResponse, ProductDao, SubcategoryDao},
    db::entities::{category, product, subcategory},
    error::AppError,
};

pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    fn validate(&self) -> Result<(), AppError> {
        if !IMAGE_MIMETYPE_LIST.contains(&self.content_type.as_str()) {
            return Err(AppError::bad_request(format!(
                "Unsupported image type: {}",
                self.content_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(AppError::bad_request("Image file is empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub image_urls: Vec<String>,
    pub category_ids: Vec<Uuid>,
    pub subcategory_ids: Vec<Uuid>,
    pub unit: String,
    pub stock: i32,
    pub price: f64,
    pub discount: f64,
    pub more_details: serde_json::Value,
    pub publish: bool,
}

pub struct CatalogService {
    category_dao: CategoryDao,
    subcategory_dao: SubcategoryDao,
    product_dao: ProductDao,
    images: Arc<dyn ImageStore>,
}

fn sha256_digest(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

impl CatalogService {
    pub fn new(
        category_dao: CategoryDao,
        subcategory_dao: SubcategoryDao,
        product_dao: ProductDao,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            category_dao,
            subcategory_dao,
            product_dao,
            images,
        }
    }

    pub async fn upload_image(&self, upload: ImageUpload) -> Result<String, AppError> {
        upload.validate()?;
        let uploaded = self
            .images
            .upload(&upload.file_name, &upload.content_type, upload.bytes)
            .await?;
        Ok(uploaded.url)
    }

    /// Creates a category. Submitting the exact same category again (same
    /// name, byte-identical image) returns the existing row; the same name
    /// with a different image is a conflict.
    pub async fn add_category(
        &self,
        name: &str,
        upload: ImageUpload,
    ) -> Result<(category::Model, bool), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Category name is required"));
        }
        upload.validate()?;

        if let Some(existing) = self.category_dao.find_by_name(name).await? {
            let existing_bytes = self.images.fetch(&existing.image_url).await?;
            if sha256_digest(&existing_bytes) == sha256_digest(&upload.bytes) {
                return Ok((existing, false));
            }
            return Err(AppError::conflict(
                "Category already exists with a different image",
            ));
        }

        let uploaded = self
            .images
            .upload(&upload.file_name, &upload.content_type, upload.bytes)
            .await?;
        let created = self
            .category_dao
            .create_category(name, &uploaded.url)
            .await?;
        Ok((created, true))
    }

    pub async fn list_categories(&self) -> Result<Vec<category::Model>, AppError> {
        Ok(self.category_dao.list().await?)
    }

    /// Rejects updates that would change nothing: the name is compared
    /// trimmed, the image by content hash against the stored URL's bytes.
    pub async fn update_category(
        &self,
        category_id: &Uuid,
        name: Option<String>,
        upload: Option<ImageUpload>,
    ) -> Result<category::Model, AppError> {
        let existing = self.category_dao.find_by_id(*category_id).await?;

        let new_name = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty() && *name != existing.name);
        let image_url = match upload {
            Some(upload) => self.upload_if_changed(&existing.image_url, upload).await?,
            None => None,
        };

        if new_name.is_none() && image_url.is_none() {
            return Err(AppError::conflict("No changes detected"));
        }

        let updated = self
            .category_dao
            .update(*category_id, move |active| {
                if let Some(name) = new_name {
                    active.name = Set(name);
                }
                if let Some(url) = image_url {
                    active.image_url = Set(url);
                }
            })
            .await?;
        Ok(updated)
    }

    /// Uploads the image only when its content differs from what the stored
    /// URL currently serves; `None` means the image is unchanged.
    async fn upload_if_changed(
        &self,
        stored_url: &str,
        upload: ImageUpload,
    ) -> Result<Option<String>, AppError> {
        upload.validate()?;
        if !stored_url.is_empty() {
            let stored = self.images.fetch(stored_url).await?;
            if sha256_digest(&stored) == sha256_digest(&upload.bytes) {
                return Ok(None);
            }
        }
        let uploaded = self
            .images
            .upload(&upload.file_name, &upload.content_type, upload.bytes)
            .await?;
        Ok(Some(uploaded.url))
    }

    /// Deletion is blocked while subcategories or products still reference
    /// the category.
    pub async fn delete_category(&self, category_id: &Uuid) -> Result<(), AppError> {
        let subcategories = self.subcategory_dao.list_by_category(category_id).await?;
        let product_count = self
            .product_dao
            .count_referencing_category(category_id)
            .await?;
        if !subcategories.is_empty() || product_count > 0 {
            return Err(AppError::conflict(
                "Category is in use and cannot be deleted",
            ));
        }

        self.category_dao.delete(*category_id).await?;
        Ok(())
    }

    pub async fn add_subcategory(
        &self,
        name: &str,
        category_ids: &[Uuid],
        upload: ImageUpload,
    ) -> Result<subcategory::Model, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Subcategory name is required"));
        }
        if category_ids.is_empty() {
            return Err(AppError::bad_request(
                "At least one category id is required",
            ));
        }
        upload.validate()?;

        for category_id in category_ids {
            self.category_dao.find_by_id(*category_id).await?;
        }

        let uploaded = self
            .images
            .upload(&upload.file_name, &upload.content_type, upload.bytes)
            .await?;
        let created = self
            .subcategory_dao
            .create_subcategory(name, &uploaded.url, category_ids)
            .await?;
        Ok(created)
    }

    pub async fn list_subcategories(&self) -> Result<Vec<subcategory::Model>, AppError> {
        Ok(self.subcategory_dao.list().await?)
    }

    pub async fn list_subcategories_by_category(
        &self,
        category_id: &Uuid,
    ) -> Result<Vec<subcategory::Model>, AppError> {
        Ok(self.subcategory_dao.list_by_category(category_id).await?)
    }

    pub async fn update_subcategory(
        &self,
        subcategory_id: &Uuid,
        name: Option<String>,
        category_ids: Option<Vec<Uuid>>,
        upload: Option<ImageUpload>,
    ) -> Result<subcategory::Model, AppError> {
        let existing = self.subcategory_dao.find_by_id(*subcategory_id).await?;

        if let Some(ids) = category_ids.as_deref() {
            if ids.is_empty() {
                return Err(AppError::bad_request(
                    "At least one category id is required",
                ));
            }
            for category_id in ids {
                self.category_dao.find_by_id(*category_id).await?;
            }
        }

        let new_name = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty() && *name != existing.name);
        let new_ids = category_ids
            .map(|ids| subcategory::ids_to_json(&ids))
            .filter(|ids| *ids != existing.category_ids);
        let image_url = match upload {
            Some(upload) => self.upload_if_changed(&existing.image_url, upload).await?,
            None => None,
        };

        if new_name.is_none() && new_ids.is_none() && image_url.is_none() {
            return Err(AppError::conflict("No changes detected"));
        }

        let updated = self
            .subcategory_dao
            .update(*subcategory_id, move |active| {
                if let Some(name) = new_name {
                    active.name = Set(name);
                }
                if let Some(ids) = new_ids {
                    active.category_ids = Set(ids);
                }
                if let Some(url) = image_url {
                    active.image_url = Set(url);
                }
            })
            .await?;
        Ok(updated)
    }

    pub async fn delete_subcategory(&self, subcategory_id: &Uuid) -> Result<(), AppError> {
        let product_count = self
            .product_dao
            .count_referencing_subcategory(subcategory_id)
            .await?;
        if product_count > 0 {
            return Err(AppError::conflict(
                "Subcategory is in use and cannot be deleted",
            ));
        }

        self.subcategory_dao.delete(*subcategory_id).await?;
        Ok(())
    }

    pub async fn add_product(&self, input: ProductInput) -> Result<product::Model, AppError> {
        validate_product_input(&input)?;
        if input.image_urls.is_empty() {
            return Err(AppError::bad_request("At least one image is required"));
        }

        let model = product::ActiveModel {
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            images: Set(serde_json::json!(input.image_urls)),
            category_ids: Set(ids_json(&input.category_ids)),
            subcategory_ids: Set(ids_json(&input.subcategory_ids)),
            unit: Set(input.unit),
            stock: Set(input.stock),
            price: Set(input.price),
            discount: Set(input.discount),
            more_details: Set(input.more_details),
            publish: Set(input.publish),
            ..Default::default()
        };
        Ok(self.product_dao.create(model).await?)
    }

    pub async fn search_products(
        &self,
        page: u64,
        page_size: u64,
        term: Option<&str>,
    ) -> Result<PaginatedResponse<product::Model>, AppError> {
        Ok(self.product_dao.search(page, page_size, term).await?)
    }

    pub async fn products_by_category(
        &self,
        category_id: &Uuid,
        limit: u64,
    ) -> Result<Vec<product::Model>, AppError> {
        Ok(self.product_dao.list_by_category(category_id, limit).await?)
    }

    pub async fn products_by_category_and_subcategory(
        &self,
        category_id: &Uuid,
        subcategory_id: &Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<product::Model>, AppError> {
        Ok(self
            .product_dao
            .list_by_category_and_subcategory(category_id, subcategory_id, page, page_size)
            .await?)
    }

    pub async fn product_details(&self, product_id: &Uuid) -> Result<product::Model, AppError> {
        Ok(self.product_dao.find_by_id(*product_id).await?)
    }

    /// An update with no new image files keeps the stored images; a request
    /// where every proposed value matches the stored row is a conflict.
    pub async fn update_product(
        &self,
        product_id: &Uuid,
        input: ProductInput,
    ) -> Result<product::Model, AppError> {
        validate_product_input(&input)?;

        let existing = self.product_dao.find_by_id(*product_id).await?;

        let images = if input.image_urls.is_empty() {
            existing.images.clone()
        } else {
            serde_json::json!(input.image_urls)
        };

        let unchanged = images == existing.images
            && input.name.trim() == existing.name
            && input.description == existing.description
            && ids_json(&input.category_ids) == existing.category_ids
            && ids_json(&input.subcategory_ids) == existing.subcategory_ids
            && input.unit == existing.unit
            && input.stock == existing.stock
            && input.price == existing.price
            && input.discount == existing.discount
            && input.more_details == existing.more_details
            && input.publish == existing.publish;
        if unchanged {
            return Err(AppError::conflict("No changes detected"));
        }

        let updated = self
            .product_dao
            .update(*product_id, move |active| {
                active.name = Set(input.name.trim().to_string());
                active.description = Set(input.description);
                active.images = Set(images);
                active.category_ids = Set(ids_json(&input.category_ids));
                active.subcategory_ids = Set(ids_json(&input.subcategory_ids));
                active.unit = Set(input.unit);
                active.stock = Set(input.stock);
                active.price = Set(input.price);
                active.discount = Set(input.discount);
                active.more_details = Set(input.more_details);
                active.publish = Set(input.publish);
            })
            .await?;
        Ok(updated)
    }

    pub async fn delete_product(&self, product_id: &Uuid) -> Result<(), AppError> {
        self.product_dao.delete(*product_id).await?;
        Ok(())
    }
}

fn ids_json(ids: &[Uuid]) -> serde_json::Value {
    serde_json::json!(ids.iter().map(Uuid::to_string).collect::<Vec<_>>())
}

fn validate_product_input(input: &ProductInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::bad_request("Product name is required"));
    }
    if input.category_ids.is_empty() {
        return Err(AppError::bad_request("At least one category id is required"));
    }
    if input.stock < 0 {
        return Err(AppError::bad_request("Stock cannot be negative"));
    }
    if input.price < 0.0 || input.discount < 0.0 {
        return Err(AppError::bad_request("Price and discount cannot be negative"));
    }
    Ok(())
}
