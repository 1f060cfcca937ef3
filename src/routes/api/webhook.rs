use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Router,
};

use crate::{
    response::{ApiResult, JsonApiResponse},
    services::webhook_service::{self, WebhookEvent},
    services::ServiceContext,
    state::AppState,
};

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/payment", post(payment_webhook))
        .with_state(state)
}

/// The gateway retries any non-2xx delivery, so every outcome short of a
/// transport failure is acknowledged with 200. The envelope message records
/// what actually happened for the gateway's delivery log.
async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<serde_json::Value> {
    let Some(payment) = state.config.payment.as_ref() else {
        tracing::warn!("webhook received but no payment gateway is configured");
        return JsonApiResponse::message("Webhook received");
    };

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("webhook delivery is missing its signature header");
        return JsonApiResponse::message("Webhook received but signature missing");
    };

    if !webhook_service::verify_signature(&payment.webhook_secret, &body, signature) {
        tracing::warn!("webhook signature did not verify");
        return JsonApiResponse::message("Webhook signature verification failed");
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "webhook payload failed to parse");
            return JsonApiResponse::message("Webhook received with processing errors");
        }
    };

    let services = ServiceContext::from_state(&state);
    services.webhook().process(event).await;
    JsonApiResponse::message("Webhook processed successfully")
}
