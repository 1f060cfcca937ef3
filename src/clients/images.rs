use serde::Deserialize;

use crate::config::ImageStoreConfig;
use crate::error::AppError;

pub const IMAGE_MIMETYPE_LIST: &[&str] = &["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, AppError>;

    /// Downloads a previously uploaded image so callers can compare contents.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError>;
}

/// Multipart upload client for the external image host.
pub struct HttpImageStore {
    http: reqwest::Client,
    upload_url: String,
    api_key: String,
    folder: String,
}

impl HttpImageStore {
    pub fn new(config: &ImageStoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            folder: config.folder.clone(),
        }
    }
}

#[async_trait::async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, AppError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|err| AppError::bad_request(format!("invalid content type: {err}")))?;
        let form = reqwest::multipart::Form::new()
            .text("folder", self.folder.clone())
            .part("file", part);

        let response = self
            .http
            .post(&self.upload_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|err| AppError::internal(format!("image upload failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "image host rejected upload");
            return Err(AppError::internal(format!(
                "image upload failed with status {status}"
            )));
        }

        response
            .json::<UploadedImage>()
            .await
            .map_err(|err| AppError::internal(format!("invalid image host response: {err}")))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| AppError::internal(format!("image fetch failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::internal(format!(
                "image fetch failed with status {status}"
            )));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| AppError::internal(format!("image fetch failed: {err}")))
    }
}

/// Stands in when no image host is configured; upload endpoints report the
/// missing configuration instead of panicking.
pub struct UnconfiguredImageStore;

#[async_trait::async_trait]
impl ImageStore for UnconfiguredImageStore {
    async fn upload(
        &self,
        _file_name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<UploadedImage, AppError> {
        Err(AppError::internal("image store is not configured"))
    }

    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, AppError> {
        Err(AppError::internal("image store is not configured"))
    }
}
