use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::auth::Role;
use crate::db::entities::user::{self, UserStatus};
use crate::db::entities::prelude::User;

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find(1, 1, None, move |query| {
            query.filter(user::Column::Email.eq(email))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            avatar_url: Set(String::new()),
            mobile: Set(None),
            role: Set(role.as_str().to_string()),
            status: Set(UserStatus::Active.as_str().to_string()),
            email_verified: Set(false),
            forgot_password_otp: Set(None),
            forgot_password_expiry: Set(None),
            last_login_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn mark_email_verified(&self, id: &Uuid) -> DaoResult<user::Model> {
        self.update(*id, |active| {
            active.email_verified = Set(true);
        })
        .await
    }

    pub async fn set_last_login(
        &self,
        id: &Uuid,
        at: &DateTime<FixedOffset>,
    ) -> DaoResult<()> {
        let at = *at;
        self.update(*id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
        .map(|_| ())
    }

    pub async fn set_password_reset_otp(
        &self,
        id: &Uuid,
        otp: &str,
        expiry: &DateTime<FixedOffset>,
    ) -> DaoResult<()> {
        let otp = otp.to_string();
        let expiry = *expiry;
        self.update(*id, move |active| {
            active.forgot_password_otp = Set(Some(otp));
            active.forgot_password_expiry = Set(Some(expiry));
        })
        .await
        .map(|_| ())
    }

    pub async fn reset_password(&self, id: &Uuid, password_hash: &str) -> DaoResult<()> {
        let hash = password_hash.to_string();
        self.update(*id, move |active| {
            active.password_hash = Set(hash);
            active.forgot_password_otp = Set(None);
            active.forgot_password_expiry = Set(None);
        })
        .await
        .map(|_| ())
    }

    pub async fn set_avatar(&self, id: &Uuid, avatar_url: &str) -> DaoResult<user::Model> {
        let url = avatar_url.to_string();
        self.update(*id, move |active| {
            active.avatar_url = Set(url);
        })
        .await
    }
}
