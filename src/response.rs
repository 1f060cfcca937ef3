use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;

pub type ApiResult<T> = Result<JsonApiResponse<T>, AppError>;

/// Uniform JSON envelope shared by every endpoint:
/// `{ message?, data?, success, errorMessage?, errorDetails?, timestamp }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> JsonApiResponse<T> {
    pub fn ok(data: T) -> ApiResult<T> {
        Ok(Self::with_status(StatusCode::OK, None, Some(data)))
    }

    pub fn ok_message(message: impl Into<String>, data: T) -> ApiResult<T> {
        Ok(Self::with_status(
            StatusCode::OK,
            Some(message.into()),
            Some(data),
        ))
    }

    pub fn created(message: impl Into<String>, data: T) -> ApiResult<T> {
        Ok(Self::with_status(
            StatusCode::CREATED,
            Some(message.into()),
            Some(data),
        ))
    }

    pub fn with_status(status: StatusCode, message: Option<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            message,
            data,
            success: true,
            error_message: None,
            error_details: None,
            timestamp: Utc::now(),
        }
    }
}

impl JsonApiResponse<serde_json::Value> {
    /// Success envelope with a message and no data payload.
    pub fn message(message: impl Into<String>) -> ApiResult<serde_json::Value> {
        Ok(Self::with_status(StatusCode::OK, Some(message.into()), None))
    }

    pub(crate) fn from_error(err: &AppError) -> Self {
        let status = status_for(err);
        Self {
            status: status.as_u16(),
            message: None,
            data: None,
            success: false,
            error_message: Some(err.message().to_string()),
            error_details: err.details().cloned(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        JsonApiResponse::from_error(&self).into_response()
    }
}

impl<T: Serialize> IntoResponse for JsonApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

pub(crate) fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::BadRequest(..) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
