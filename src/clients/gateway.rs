use serde::{Deserialize, Serialize};

use crate::config::PaymentConfig;
use crate::error::AppError;

/// Order-creation request sent to the hosted payment gateway. Amounts are in
/// the currency's minor unit (paise for INR).
#[derive(Debug, Clone, Serialize)]
pub struct CreateGatewayOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder, AppError>;
}

/// REST client for the hosted gateway's order endpoint, authenticated with
/// key id / key secret basic auth.
pub struct HostedGateway {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl HostedGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for HostedGateway {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder, AppError> {
        let url = format!("{}/v1/orders", self.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|err| AppError::internal(format!("gateway request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "gateway order creation rejected");
            return Err(AppError::internal(format!(
                "gateway order creation failed with status {status}"
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|err| AppError::internal(format!("invalid gateway response: {err}")))
    }
}

/// Stands in when no gateway credentials are configured; online checkout is
/// rejected while the rest of the API keeps working.
pub struct DisabledGateway;

#[async_trait::async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_order(&self, _request: CreateGatewayOrder) -> Result<GatewayOrder, AppError> {
        Err(AppError::internal("payment gateway is not configured"))
    }
}
