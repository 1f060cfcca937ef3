use std::collections::HashMap;

use axum::extract::Multipart;
use uuid::Uuid;

use crate::{error::AppError, services::catalog_service::ImageUpload};

/// A fully-drained multipart form: text fields by name, file parts in
/// submission order.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<FilePart>,
}

#[derive(Debug)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| AppError::bad_request(format!("Malformed multipart body: {err}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name() {
                Some(file_name) => {
                    let file_name = file_name.to_string();
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| {
                            AppError::bad_request(format!("Failed to read upload: {err}"))
                        })?
                        .to_vec();
                    form.files.push(FilePart {
                        field: name,
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                None => {
                    let value = field.text().await.map_err(|err| {
                        AppError::bad_request(format!("Failed to read form field: {err}"))
                    })?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn text_required(&self, name: &str) -> Result<&str, AppError> {
        self.text(name).ok_or_else(|| {
            AppError::bad_request(format!("Required field '{name}' was not provided"))
        })
    }

    /// Comma-separated uuid list, e.g. `categoryIds=id1,id2`.
    pub fn id_list(&self, name: &str) -> Result<Vec<Uuid>, AppError> {
        match self.text(name) {
            None => Ok(Vec::new()),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse()
                        .map_err(|_| AppError::bad_request(format!("Invalid id in '{name}': {part}")))
                })
                .collect(),
        }
    }

    pub fn file(&self, field: &str) -> Option<&FilePart> {
        self.files.iter().find(|file| file.field == field)
    }

    pub fn file_required(&self, field: &str) -> Result<&FilePart, AppError> {
        self.file(field).ok_or_else(|| {
            AppError::bad_request(format!("Required file '{field}' was not provided"))
        })
    }

    pub fn files(&self, field: &str) -> impl Iterator<Item = &FilePart> {
        self.files.iter().filter(move |file| file.field == field)
    }
}

impl FilePart {
    pub fn to_image_upload(&self) -> ImageUpload {
        ImageUpload {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes: self.bytes.clone(),
        }
    }
}
