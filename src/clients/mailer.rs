use serde::Serialize;

use crate::config::EmailConfig;
use crate::error::AppError;

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// JSON API client for the transactional email provider.
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: String,
}

impl HttpMailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let request = SendEmailRequest {
            from: &self.sender,
            to,
            subject,
            html: html_body,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| AppError::internal(format!("email send failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, to, "email provider rejected message");
            return Err(AppError::internal(format!(
                "email send failed with status {status}"
            )));
        }

        Ok(())
    }
}

/// Logs instead of sending; used when no email provider is configured so
/// registration still works in development.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), AppError> {
        tracing::info!(to, subject, "email provider not configured, skipping send");
        Ok(())
    }
}
