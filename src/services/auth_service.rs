use std::sync::Arc;

use crate::{
    auth::{
        jwt::{JwtKeys, encode_token, make_access_claims},
        otp::{generate_otp, otp_expired, otp_expiry},
        password::{hash_password, verify_password},
        Role, TokenBundle,
    },
    clients::{templates, Mailer},
    config::{AppConfig, AuthConfig},
    db::dao::{DaoBase, RefreshTokenDao, UserDao},
    db::entities::user::{self, UserStatus},
    error::AppError,
};

pub struct AuthService {
    user_dao: UserDao,
    refresh_token_dao: RefreshTokenDao,
    jwt: JwtKeys,
    config: AppConfig,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(
        user_dao: UserDao,
        refresh_token_dao: RefreshTokenDao,
        jwt: JwtKeys,
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            user_dao,
            refresh_token_dao,
            jwt,
            config,
            mailer,
        }
    }

    fn auth_config(&self) -> Result<&AuthConfig, AppError> {
        self.config
            .auth
            .as_ref()
            .ok_or_else(|| AppError::internal("auth config missing"))
    }

    async fn issue_tokens(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let auth = self.auth_config()?;
        let primary_role = Role::try_from(user.role.as_str()).unwrap_or(Role::User);
        let mut roles = vec![primary_role.clone()];
        if matches!(primary_role, Role::Admin) {
            roles.push(Role::User);
        }
        let claims = make_access_claims(&user.id, roles, auth.access_ttl_secs);
        let access_token = encode_token(&self.jwt, &claims)?;

        let refresh = self
            .refresh_token_dao
            .create_refresh_token(&user.id, auth.refresh_ttl_days)
            .await?;

        Ok(TokenBundle {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_in: auth.access_ttl_secs,
        })
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<user::Model, AppError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() {
            return Err(AppError::bad_request("Name and email are required"));
        }

        if self.user_dao.find_by_email(email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_dao
            .create_user(username, email, &password_hash, Role::User)
            .await?;

        let verify_url = format!(
            "{}/verify-email?code={}",
            self.config.general.frontend_origin, user.id
        );
        let body = templates::verify_email_body(&user.username, &verify_url);
        if let Err(err) = self
            .mailer
            .send(&user.email, "Verify your email", &body)
            .await
        {
            tracing::warn!(email = %user.email, %err, "verification email failed to send");
        }

        Ok(user)
    }

    pub async fn verify_email(&self, code: &uuid::Uuid) -> Result<user::Model, AppError> {
        Ok(self.user_dao.mark_email_verified(code).await?)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, TokenBundle), AppError> {
        let user = self
            .user_dao
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        if UserStatus::try_from(user.status.as_str()) != Ok(UserStatus::Active) {
            return Err(AppError::forbidden("Account is not active, contact support"));
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let now = chrono::Utc::now().fixed_offset();
        self.user_dao.set_last_login(&user.id, &now).await?;

        let tokens = self.issue_tokens(&user).await?;
        Ok((user, tokens))
    }

    /// Rotates the refresh token: the presented token is revoked and a fresh
    /// pair is issued.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let token = self
            .refresh_token_dao
            .find_active_by_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if token.expires_at < chrono::Utc::now().fixed_offset() {
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        let user = self.user_dao.find_by_id(token.user_id).await?;

        self.refresh_token_dao.revoke_token(refresh_token).await?;

        self.issue_tokens(&user).await
    }

    pub async fn logout(
        &self,
        user_id: &uuid::Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), AppError> {
        match refresh_token {
            Some(token) => self.refresh_token_dao.revoke_token(token).await?,
            None => self.refresh_token_dao.revoke_all_for_user(user_id).await?,
        }
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let user = self
            .user_dao
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("No account with that email"))?;

        let otp = generate_otp();
        let expiry = otp_expiry();
        self.user_dao
            .set_password_reset_otp(&user.id, &otp, &expiry)
            .await?;

        let body = templates::password_reset_otp_body(&user.username, &otp);
        self.mailer
            .send(&user.email, "Password reset code", &body)
            .await?;

        Ok(())
    }

    pub async fn verify_password_reset_otp(&self, email: &str, otp: &str) -> Result<(), AppError> {
        let user = self
            .user_dao
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("No account with that email"))?;

        check_otp(&user, otp)
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        if new_password != confirm_password {
            return Err(AppError::bad_request("Passwords do not match"));
        }

        let user = self
            .user_dao
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("No account with that email"))?;

        check_otp(&user, otp)?;

        let hash = hash_password(new_password)?;
        self.user_dao.reset_password(&user.id, &hash).await?;
        self.refresh_token_dao.revoke_all_for_user(&user.id).await?;

        Ok(())
    }

    pub async fn seed_admin(&self) -> anyhow::Result<()> {
        let auth = self
            .config
            .auth
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("auth config missing"))?;

        if let Some(existing) = self
            .user_dao
            .find_by_email(&auth.admin_email)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?
        {
            tracing::info!("admin user already present: {}", existing.email);
            return Ok(());
        }

        let hash = hash_password(&auth.admin_password)
            .map_err(|err| anyhow::anyhow!("admin seed hash error: {err}"))?;
        let user = self
            .user_dao
            .create_user("Admin", &auth.admin_email, &hash, Role::Admin)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?;
        tracing::info!("seeded admin user {}", user.email);
        Ok(())
    }
}

fn check_otp(user: &user::Model, otp: &str) -> Result<(), AppError> {
    let stored = user
        .forgot_password_otp
        .as_deref()
        .ok_or_else(|| AppError::bad_request("No password reset was requested"))?;
    let expiry = user
        .forgot_password_expiry
        .as_ref()
        .ok_or_else(|| AppError::bad_request("No password reset was requested"))?;

    if otp_expired(expiry) {
        return Err(AppError::bad_request("OTP has expired"));
    }
    if stored != otp {
        return Err(AppError::bad_request("Invalid OTP"));
    }
    Ok(())
}
