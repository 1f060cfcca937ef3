use std::sync::Arc;

use sea_orm::Set;
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    clients::images::{ImageStore, IMAGE_MIMETYPE_LIST},
    db::dao::{DaoBase, UserDao},
    db::entities::user,
    error::AppError,
};

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
}

pub struct UserService {
    user_dao: UserDao,
    images: Arc<dyn ImageStore>,
}

impl UserService {
    pub fn new(user_dao: UserDao, images: Arc<dyn ImageStore>) -> Self {
        Self { user_dao, images }
    }

    pub async fn profile(&self, user_id: &Uuid) -> Result<user::Model, AppError> {
        Ok(self.user_dao.find_by_id(*user_id).await?)
    }

    pub async fn update_profile(
        &self,
        user_id: &Uuid,
        update: ProfileUpdate,
    ) -> Result<user::Model, AppError> {
        if let Some(email) = update.email.as_deref() {
            let email = email.trim();
            if email.is_empty() {
                return Err(AppError::bad_request("Email cannot be blank"));
            }
            if let Some(existing) = self.user_dao.find_by_email(email).await? {
                if existing.id != *user_id {
                    return Err(AppError::conflict("Email is already registered"));
                }
            }
        }

        let password_hash = match update.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = self
            .user_dao
            .update(*user_id, move |active| {
                if let Some(username) = update.username {
                    active.username = Set(username);
                }
                if let Some(email) = update.email {
                    active.email = Set(email.trim().to_string());
                }
                if let Some(mobile) = update.mobile {
                    active.mobile = Set(Some(mobile));
                }
                if let Some(hash) = password_hash {
                    active.password_hash = Set(hash);
                }
            })
            .await?;
        Ok(user)
    }

    pub async fn upload_avatar(
        &self,
        user_id: &Uuid,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<user::Model, AppError> {
        if !IMAGE_MIMETYPE_LIST.contains(&content_type) {
            return Err(AppError::bad_request(format!(
                "Unsupported image type: {content_type}"
            )));
        }
        if bytes.is_empty() {
            return Err(AppError::bad_request("Image file is empty"));
        }

        let uploaded = self.images.upload(file_name, content_type, bytes).await?;
        Ok(self.user_dao.set_avatar(user_id, &uploaded.url).await?)
    }
}
