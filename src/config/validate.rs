use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.frontend_origin.trim().is_empty() {
        errors.push("general.frontend_origin must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.jwt_secret.trim().is_empty() {
            errors.push("auth.jwt_secret must not be empty".to_string());
        }

        if auth.access_ttl_secs == 0 {
            errors.push("auth.access_ttl_secs must be > 0".to_string());
        }

        if auth.refresh_ttl_days <= 0 {
            errors.push("auth.refresh_ttl_days must be > 0".to_string());
        }

        if auth.admin_email.trim().is_empty() {
            errors.push("auth.admin_email must not be empty".to_string());
        }

        if auth.admin_password.len() < 8 {
            errors.push("auth.admin_password must be at least 8 characters".to_string());
        }
    }

    if let Some(payment) = cfg.payment.as_ref() {
        if payment.base_url.trim().is_empty() {
            errors.push("payment.base_url must not be empty".to_string());
        }

        if payment.key_id.trim().is_empty() || payment.key_secret.trim().is_empty() {
            errors.push("payment.key_id and payment.key_secret must not be empty".to_string());
        }

        if payment.webhook_secret.trim().is_empty() {
            errors.push("payment.webhook_secret must not be empty".to_string());
        }
    }

    if let Some(images) = cfg.images.as_ref() {
        if images.upload_url.trim().is_empty() {
            errors.push("images.upload_url must not be empty".to_string());
        }
    }

    if let Some(email) = cfg.email.as_ref() {
        if email.api_url.trim().is_empty() || email.api_key.trim().is_empty() {
            errors.push("email.api_url and email.api_key must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
